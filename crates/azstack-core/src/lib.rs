//! azstack Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers for declaring Azure stacks, realizing them
//! through a cloud provider port and wiring outputs from one stack into
//! another.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           azstack-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (DeploymentService, engine, sources)  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (CloudProvider, StateStore, Program)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    azstack-adapters (Infrastructure)    │
//! │ (SimulatedCloud, LocalStateStore, ...)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Output, Deployment, CrossStackOutputs) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use azstack_core::prelude::*;
//!
//! # fn run(service: DeploymentService) -> CoreResult<()> {
//! let context = StackContext::new("organization", "base-infra", "dev")?;
//! let config = StackConfig::new("base-infra").with_value("azure-native:location", "westus2");
//! let summary = service.up("base-infra", context, config)?;
//! println!("{:?}", summary.outputs(false));
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, CloudProvider, CrossStackSource, DeploymentService, ManifestRenderer,
        Preview, Program, ProgramContext, ProgramInfo, ProgramStore, StateStore, UpdateSummary,
    };
    pub use crate::domain::{
        CrossStackOutputs, Deployment, DomainError, Input, Output, ResourceOptions, ResourceType,
        StackConfig, StackContext, StackRef, StackState, Urn,
    };
    pub use crate::error::{CoreError, CoreResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
