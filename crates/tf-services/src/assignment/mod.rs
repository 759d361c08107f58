//! Automatic assignment engine and its sweep scheduler

pub mod engine;
pub mod scheduler;

pub use engine::{Assignment, AssignmentEngine, SweepReport};
pub use scheduler::SweepScheduler;
