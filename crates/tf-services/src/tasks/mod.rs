//! Task lifecycle services
//!
//! Create → progress edits → submit for review → accept (terminal) or
//! reject/needs-improvement (reopens). Each step is one service.

pub mod create;
pub mod progress;
pub mod review;
pub mod submit;

pub use create::CreateTaskService;
pub use progress::UpdateProgressService;
pub use review::{ReviewDecision, ReviewOutcome, ReviewTaskService};
pub use submit::SubmitForReviewService;
