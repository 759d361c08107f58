//! Core error types for TaskForce RS
//!
//! The taxonomy separates authorization failures, precondition failures,
//! consistency violations, and collaborator failures: the first three reject
//! an operation before any state mutation, the last is warning-grade and must
//! never fail the primary operation that triggered it.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all TaskForce operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Caller's role/team does not permit the action. Rejected before any
    /// state mutation.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The target is not in a state that admits the operation (task not
    /// pending, progress below 100, no idle workers, ...).
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// The mutation would create an inconsistency (team mismatch, duplicate
    /// team lead, ...). Rejected at the boundary that would create it.
    #[error("Consistency violation: {message}")]
    Inconsistent { message: String },

    /// A concurrent writer got there first (double assignment, failed
    /// re-validation). Retryable at the caller's discretion.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A side-channel collaborator (notification, email) failed. Logged and
    /// surfaced as a warning, never as a failure of the primary operation.
    #[error("Collaborator failure: {collaborator} - {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Machine-readable code for logs and API surfaces built on top
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Forbidden { .. } => "forbidden",
            Error::Precondition { .. } => "precondition_failed",
            Error::Inconsistent { .. } => "consistency_violation",
            Error::Conflict { .. } => "conflict",
            Error::Validation(_) => "validation_failed",
            Error::Storage(_) => "storage_error",
            Error::Collaborator { .. } => "collaborator_failure",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether this error may be logged and swallowed without failing the
    /// operation that triggered it
    pub fn is_warning_grade(&self) -> bool {
        matches!(self, Error::Collaborator { .. })
    }
}

/// Validation errors collection
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}
