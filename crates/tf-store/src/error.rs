//! Storage error type

use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A re-validation inside the commit failed: someone else got there
    /// first. Callers treat this as "skip and move on", not as corruption.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested write would leave the store inconsistent
    #[error("Inconsistent: {0}")]
    Inconsistent(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StorageError>;

impl From<StorageError> for tf_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => tf_core::Error::Storage(format!("not found: {msg}")),
            StorageError::Conflict(msg) => tf_core::Error::conflict(msg),
            StorageError::Inconsistent(msg) => tf_core::Error::inconsistent(msg),
            StorageError::Backend(msg) => tf_core::Error::Storage(msg),
        }
    }
}
