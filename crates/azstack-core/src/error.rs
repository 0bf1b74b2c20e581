//! Unified error handling for azstack core.
//!
//! Wraps domain and application errors behind one type with suggestions
//! and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for azstack core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Errors from the domain layer (declaration and configuration mistakes).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (realization failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl CoreError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your stack file and try again".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in azstack".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Shorthand for a provider failure.
    pub fn provider(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Application(ApplicationError::ProviderFailed {
            operation: operation.into(),
            reason: reason.to_string(),
        })
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type CoreResult<T> = Result<T, CoreError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> CoreResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> CoreResult<T> {
        self.map_err(|e| CoreError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
