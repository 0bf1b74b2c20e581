//! Driven (output) ports - implemented by infrastructure.

use std::sync::Arc;

use serde_json::Value;

use crate::application::ports::program::{Program, ProgramInfo};
use crate::application::services::Preview;
use crate::domain::{FunctionCall, ProviderResource, ResourceType, StackRef, StackState};
use crate::error::CoreResult;

/// Port for the cloud resource-management API and the caller's
/// authentication context.
///
/// Implemented by:
/// - `azstack_adapters::cloud::SimulatedCloud`
#[cfg_attr(test, mockall::automock)]
pub trait CloudProvider: Send + Sync {
    /// Create a resource from fully resolved inputs.
    fn create(
        &self,
        resource_type: ResourceType,
        name: &str,
        inputs: &Value,
    ) -> CoreResult<ProviderResource>;

    /// Call a provider function.
    fn invoke(&self, call: &FunctionCall) -> CoreResult<Value>;

    /// Delete a resource by provider id.
    fn delete(&self, resource_type: ResourceType, id: &str) -> CoreResult<()>;
}

/// Port for persisted stack state.
///
/// Implemented by:
/// - `azstack_adapters::state_store::InMemoryStateStore` (testing)
/// - `azstack_adapters::state_store::LocalStateStore` (JSON files on disk)
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send + Sync {
    fn get(&self, stack: &StackRef) -> CoreResult<Option<StackState>>;

    /// Insert or replace the state of `state.stack`.
    fn put(&self, state: &StackState) -> CoreResult<()>;

    /// Returns `false` if nothing was stored.
    fn remove(&self, stack: &StackRef) -> CoreResult<bool>;

    /// All stacks with recorded state, sorted.
    fn list(&self) -> CoreResult<Vec<StackRef>>;
}

/// Port for program lookup.
pub trait ProgramStore: Send + Sync {
    fn get(&self, name: &str) -> CoreResult<Arc<dyn Program>>;

    fn list(&self) -> CoreResult<Vec<ProgramInfo>>;
}

/// Port for rendering a preview into text.
pub trait ManifestRenderer: Send + Sync {
    fn render(&self, preview: &Preview) -> CoreResult<String>;
}
