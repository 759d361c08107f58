//! Contract validation and authorization for TaskForce RS
//!
//! Every operation of the core validates through a contract before touching
//! state. Authorization is a single capability table keyed by role and
//! action, evaluated once per operation; no call site re-derives role logic.

pub mod authorization;
pub mod base;
pub mod tasks;

pub use authorization::{authorize, capability, Action, Capability, Scope};
pub use base::{Actor, Contract, ValidationResult};
