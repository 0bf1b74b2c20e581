// ============================================================================
// domain/error.rs - DECLARATION ERRORS
// ============================================================================

use thiserror::Error;

/// Result alias used throughout the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (stashed by resolvers, replayed by the engine)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Missing required configuration value '{key}'")]
    MissingConfig { key: String },

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Stack output '{name}' is missing from {provenance}")]
    MissingStackOutput { name: String, provenance: String },

    // ========================================================================
    // Declaration Errors (rejected before reaching the engine)
    // ========================================================================
    #[error("Container '{container}' must declare at least one partition key path")]
    EmptyPartitionKey { container: String },

    #[error("Partition key path '{path}' of container '{container}' must start with '/'")]
    InvalidPartitionKeyPath { container: String, path: String },

    #[error("Invalid locations for database account '{account}': {reason}")]
    InvalidLocations { account: String, reason: String },

    #[error("Invalid resource name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error("Resource '{urn}' is declared more than once")]
    DuplicateResource { urn: String },

    #[error("Stack output '{name}' is exported more than once")]
    DuplicateExport { name: String },

    #[error("Resource '{resource}' depends on '{dependency}', which is not declared")]
    UnknownDependency { resource: String, dependency: String },

    #[error("Transform '{name}' is already registered")]
    TransformAlreadyRegistered { name: String },

    #[error("Invalid stack reference '{value}': {reason}")]
    InvalidStackRef { value: String, reason: String },

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("Value of {what} is not known yet")]
    Unknown { what: String },

    #[error("Expected {expected} for {what}")]
    TypeMismatch { what: String, expected: &'static str },

    #[error("Could not resolve {what}: {reason}")]
    ResolutionFailed { what: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingConfig { key } => vec![
                format!("Set '{key}' in the stack file (Stack.<stack>.toml) under [config]"),
                "Or import an environment that provides it under [environment]".into(),
            ],
            Self::InvalidConfig { key, reason } => vec![
                format!("Fix the value of '{key}': {reason}"),
            ],
            Self::MissingStackOutput { name, provenance } => vec![
                format!("'{name}' was not found in {provenance}"),
                "Run `azstack up base-infra` for the referenced stack first".into(),
                "Or provide the value through an imported environment".into(),
            ],
            Self::EmptyPartitionKey { .. } | Self::InvalidPartitionKeyPath { .. } => vec![
                "Partition keys look like \"/myPartitionKey\"".into(),
            ],
            Self::InvalidLocations { .. } => vec![
                "Declare exactly one location with failover priority 0".into(),
            ],
            Self::TransformAlreadyRegistered { .. } => vec![
                "Register each transform once, before the resources it should affect".into(),
            ],
            Self::InvalidStackRef { .. } => vec![
                "Stack references look like <organization>/<project>/<stack>".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfig { .. }
            | Self::InvalidConfig { .. }
            | Self::MissingStackOutput { .. } => ErrorCategory::Configuration,
            Self::EmptyPartitionKey { .. }
            | Self::InvalidPartitionKeyPath { .. }
            | Self::InvalidLocations { .. }
            | Self::InvalidResourceName { .. }
            | Self::DuplicateResource { .. }
            | Self::DuplicateExport { .. }
            | Self::UnknownDependency { .. }
            | Self::TransformAlreadyRegistered { .. }
            | Self::InvalidStackRef { .. } => ErrorCategory::Validation,
            Self::Unknown { .. } | Self::TypeMismatch { .. } | Self::ResolutionFailed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    NotFound,
    Internal,
}
