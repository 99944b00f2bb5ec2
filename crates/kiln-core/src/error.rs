//! Unified error handling for Kiln Core.
//!
//! Wraps domain and application errors behind one type with
//! user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, MergeError, RenderError};

/// Root error type for Kiln Core operations.
#[derive(Debug, Error, Clone)]
pub enum KilnError {
    /// Errors from the domain layer (business rule violations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl KilnError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run 'kiln config path' to find the active config file".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Kiln".into(),
                "Re-run with -vvv and include the log when reporting it".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::StoreLockError)
                | Self::Application(ApplicationError::CommandFailed { .. })
        )
    }
}

impl From<MergeError> for KilnError {
    fn from(e: MergeError) -> Self {
        Self::Domain(DomainError::Merge(e))
    }
}

impl From<RenderError> for KilnError {
    fn from(e: RenderError) -> Self {
        Self::Domain(DomainError::Render(e))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type KilnResult<T> = Result<T, KilnError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> KilnResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> KilnResult<T> {
        self.map_err(|e| KilnError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_map_through() {
        let err = KilnError::from(DomainError::SelfDependency {
            module: "a".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Compatibility);

        let err = KilnError::from(DomainError::from(MergeError::Serialize("x".into())));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let err = result.context("reading manifest").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Internal error: reading manifest: disk gone. This is a bug, please report it."
        );
    }
}
