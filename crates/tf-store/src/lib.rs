//! Persistence collaborator for TaskForce RS
//!
//! The core never talks to a database directly; it talks to the store traits
//! in this crate. [`memory::MemoryStorage`] is the reference implementation
//! and the test double. A relational adapter would implement the same traits
//! with row transactions where this crate documents atomicity.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StoreResult};
pub use memory::MemoryStorage;
pub use traits::{
    BacklogStore, CompletedTaskStore, InputHistoryStore, PerformanceStore, Storage, TaskStore,
    TeamStore, UserStore,
};
