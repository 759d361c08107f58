//! Core types and traits for TaskForce RS
//!
//! This crate provides the foundational types shared by all TaskForce crates:
//! identifiers, entity traits, the error taxonomy, and configuration.

pub mod config;
pub mod error;
pub mod traits;

pub use error::{Error, ValidationErrors};
pub use traits::Id;

/// Standard Result type for TaskForce operations
pub type AppResult<T> = Result<T, Error>;
