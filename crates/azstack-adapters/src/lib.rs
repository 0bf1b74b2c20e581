//! Infrastructure adapters for azstack.
//!
//! This crate implements the ports defined in `azstack-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_programs;
pub mod cloud;
pub mod program_store;
pub mod renderer;
pub mod stack_config;
pub mod state_store;

// Re-export commonly used adapters
pub use builtin_programs::{BaseInfra, LogicApp};
pub use cloud::{CloudIdentity, SimulatedCloud};
pub use program_store::InMemoryProgramStore;
pub use renderer::JsonManifestRenderer;
pub use stack_config::StackConfigLoader;
pub use state_store::{InMemoryStateStore, LocalStateStore};
