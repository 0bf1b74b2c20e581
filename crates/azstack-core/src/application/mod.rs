//! Application layer for azstack.
//!
//! This layer contains:
//! - **Services**: use case orchestration (`DeploymentService`) and the
//!   realization engine
//! - **Ports**: interface definitions for the cloud, state, programs and rendering
//! - **Sources**: the two ways a dependent stack gets base stack outputs
//! - **Errors**: application-specific error types

pub mod error;
pub mod ports;
pub mod services;
pub mod sources;

pub use services::{
    DeploymentEvent, DeploymentService, DestroySummary, PlannedStep, Preview, UpdateSummary,
};

pub use ports::{
    CloudProvider, ManifestRenderer, Program, ProgramContext, ProgramInfo, ProgramStore,
    StateStore,
};

pub use sources::{ConfigSource, CrossStackSource, SourceKind, StackReferenceSource, select_source};

pub use error::ApplicationError;
