// ============================================================================
//  DECLARATIONS
// ============================================================================

//! Core domain layer for azstack.
//!
//! Pure declaration logic: deferred values, resource declarations, stack
//! configuration and the cross-stack contract. Nothing here performs I/O or
//! talks to a cloud; realizing declarations is the job of the application
//! layer and the adapters behind its ports.
//!
//! ## Rules
//!
//! - **No I/O**: no filesystem, network or provider calls
//! - **No logging**: errors carry all the context callers need
//! - **No suspension**: deferred values record dependencies and are
//!   evaluated explicitly once those dependencies are realized
//! - **Explicit policy**: transforms live on the [`Deployment`] threaded
//!   through every constructor, never in global state

pub mod azure;
pub mod config;
pub mod cross_stack;
pub mod deployment;
pub mod error;
pub mod input;
pub mod output;
pub mod policy;
pub mod resource;
pub mod stack;
pub mod state;
pub mod value_objects;

pub use config::{ConfigEntry, StackConfig};
pub use cross_stack::{CrossStackOutputs, docs_path};
pub use deployment::{Deployment, Export};
pub use error::{DomainError, DomainResult, ErrorCategory};
pub use input::{Input, SECRET_PLACEHOLDER, UNKNOWN_PLACEHOLDER};
pub use output::{FunctionCall, Output, Resolve, Unresolved, all};
pub use policy::{DeploymentPolicy, ProtectTransform, ResourceTransform, TransformTarget};
pub use resource::{Function, Props, ResourceDeclaration, ResourceOptions, ResourceType, Urn};
pub use stack::{StackContext, StackRef};
pub use state::{ProviderResource, RealizedResource, StackOutput, StackState};
pub use value_objects::{
    DatabaseAccountOfferType, DefaultConsistencyLevel, PartitionKind, SkuName, StorageKind,
};
