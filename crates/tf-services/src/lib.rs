//! Business logic services for TaskForce RS
//!
//! Each service is a small object holding its collaborators (storage,
//! notifier) and exposing a `call`-style entry point that returns a
//! [`ServiceResult`]. Authorization goes through the capability table once
//! per operation; every rejection leaves prior state untouched.

pub mod assignment;
pub mod performance;
pub mod result;
pub mod tasks;
pub mod teams;
pub mod users;

pub use result::ServiceResult;
