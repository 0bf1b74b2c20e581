//! Application layer errors.
//!
//! These errors represent failures while realizing declarations: talking to
//! the provider, reading or writing state, finding programs. Declaration
//! mistakes are `DomainError`s from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during deployment orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// No state recorded for the stack.
    #[error("Stack '{stack}' not found")]
    StackNotFound { stack: String },

    /// No program registered under this name.
    #[error("Program '{name}' not found")]
    ProgramNotFound { name: String },

    /// `crossStackSource` names an unknown provenance.
    #[error("Unknown cross-stack source '{value}'")]
    UnknownSourceKind { value: String },

    /// The cloud provider rejected an operation.
    #[error("Provider {operation} failed: {reason}")]
    ProviderFailed { operation: String, reason: String },

    /// Reading or writing stack state failed.
    #[error("State store error: {reason}")]
    StateStoreError { reason: String },

    /// Store access failed (lock poisoned).
    #[error("Store lock poisoned")]
    StoreLockError,

    /// A protected resource blocks destruction.
    #[error("Resource '{urn}' is protected and cannot be deleted")]
    ProtectedResource { urn: String },

    /// A resource was reached before one of its dependencies was realized.
    #[error("Resource '{resource}' depends on '{dependency}', which was not realized")]
    UnrealizedDependency { resource: String, dependency: String },

    /// Rendering a preview manifest failed.
    #[error("Rendering failed: {reason}")]
    RenderFailed { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StackNotFound { stack } => vec![
                format!("No state recorded for '{stack}'"),
                "Try: azstack stacks to see deployed stacks".into(),
                "Deploy it first with: azstack up <program>".into(),
            ],
            Self::ProgramNotFound { .. } => vec![
                "Try: azstack list to see available programs".into(),
            ],
            Self::UnknownSourceKind { .. } => vec![
                "Set crossStackSource to 'reference' or 'config'".into(),
            ],
            Self::ProviderFailed { .. } => vec![
                "Check that parent resources were deployed".into(),
                "Run with -v for provider details".into(),
            ],
            Self::StoreLockError => vec![
                "The store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::ProtectedResource { .. } => vec![
                "Set protect_flag = \"false\" and run `azstack up` before destroying".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StackNotFound { .. } | Self::ProgramNotFound { .. } => ErrorCategory::NotFound,
            Self::UnknownSourceKind { .. } => ErrorCategory::Configuration,
            Self::ProtectedResource { .. } => ErrorCategory::Validation,
            Self::ProviderFailed { .. }
            | Self::StateStoreError { .. }
            | Self::StoreLockError
            | Self::UnrealizedDependency { .. }
            | Self::RenderFailed { .. } => ErrorCategory::Internal,
        }
    }
}
