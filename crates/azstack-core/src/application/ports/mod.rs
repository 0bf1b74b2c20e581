//! Application ports (traits) for external dependencies.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the application, implemented in
//!   `azstack-adapters`
//!   - `CloudProvider`: resource lifecycle and provider functions
//!   - `StateStore`: persisted stack state
//!   - `ProgramStore`: registered programs
//!   - `ManifestRenderer`: preview rendering
//!
//! - **Plug-in Ports**: `Program`, the declarative body of a stack

pub mod output;
pub mod program;

pub use output::{CloudProvider, ManifestRenderer, ProgramStore, StateStore};
pub use program::{Program, ProgramContext, ProgramInfo};

#[cfg(test)]
pub use output::{MockCloudProvider, MockStateStore};
