//! Service result type

use tf_core::error::{Error, ValidationErrors};

/// Represents the result of a service call
///
/// A failure carries the taxonomy [`Error`], so callers can tell an
/// authorization rejection from a precondition or a consistency violation
/// without string matching.
#[derive(Debug)]
pub struct ServiceResult<T> {
    /// Whether the service call was successful
    success: bool,
    /// The result of the service call
    result: Option<T>,
    /// The rejection, when the call failed
    error: Option<Error>,
    /// Message for display
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    /// Create a successful service result
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            message: None,
        }
    }

    /// Create a successful service result with a message
    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            message: Some(message.into()),
        }
    }

    /// Create a failed service result
    pub fn failure(error: Error) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
            message: None,
        }
    }

    /// Create a failed service result from contract validation errors
    pub fn failure_with_validation(errors: ValidationErrors) -> Self {
        Self::failure(Error::Validation(errors))
    }

    /// Check if the service call was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Check if the service call failed
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Get the result (if successful)
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Take the result (consuming it)
    pub fn take_result(&mut self) -> Option<T> {
        self.result.take()
    }

    /// Unwrap the result, panicking if it was a failure
    pub fn unwrap(self) -> T {
        match self.result {
            Some(result) => result,
            None => panic!(
                "called unwrap on a failed ServiceResult: {:?}",
                self.error
            ),
        }
    }

    /// Get the error (if failed)
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Get contract validation errors, when the failure was one
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self.error {
            Some(Error::Validation(ref errors)) => Some(errors),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Map the result value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        ServiceResult {
            success: self.success,
            result: self.result.map(f),
            error: self.error,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failure_kinds() {
        let result: ServiceResult<()> = ServiceResult::failure(Error::forbidden("nope"));
        assert!(result.is_failure());
        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
        assert!(result.validation_errors().is_none());

        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        let result: ServiceResult<()> = ServiceResult::failure_with_validation(errors);
        assert!(result.validation_errors().unwrap().has_error("title"));
    }

    #[test]
    #[should_panic]
    fn test_unwrap_failure_panics() {
        let result: ServiceResult<()> = ServiceResult::failure(Error::precondition("no"));
        result.unwrap();
    }
}
