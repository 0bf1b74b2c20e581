//! Deployment policy: resource transforms registered on a deployment.
//!
//! A transform sees the type, name, inputs and options of every resource
//! declared *after* it was registered and may rewrite inputs and options.
//! Registration order is the order in which transforms run. Transforms never
//! run retroactively, and a transform name can only be registered once.

use std::fmt;
use std::sync::Arc;

use crate::domain::{
    error::{DomainError, DomainResult},
    resource::{Props, ResourceOptions, ResourceType},
};

/// The mutable view of a declaration handed to a transform.
pub struct TransformTarget<'a> {
    pub resource_type: ResourceType,
    pub name: &'a str,
    pub inputs: &'a mut Props,
    pub options: &'a mut ResourceOptions,
}

/// A function applied to every subsequently declared resource.
pub trait ResourceTransform: Send + Sync {
    /// Unique name of this transform within a deployment.
    fn name(&self) -> &str;

    fn transform(&self, target: TransformTarget<'_>);
}

/// Forces the `protect` option to a fixed value, whatever the call site asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectTransform {
    protect: bool,
}

impl ProtectTransform {
    pub const NAME: &'static str = "protect";

    pub fn new(protect: bool) -> Self {
        Self { protect }
    }
}

impl ResourceTransform for ProtectTransform {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, target: TransformTarget<'_>) {
        target.options.protect = self.protect;
    }
}

/// Ordered, append-only set of transforms.
#[derive(Clone, Default)]
pub struct DeploymentPolicy {
    transforms: Vec<Arc<dyn ResourceTransform>>,
}

impl fmt::Debug for DeploymentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentPolicy")
            .field("transforms", &self.names())
            .finish()
    }
}

impl DeploymentPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, transform: Arc<dyn ResourceTransform>) -> DomainResult<()> {
        if self.transforms.iter().any(|t| t.name() == transform.name()) {
            return Err(DomainError::TransformAlreadyRegistered {
                name: transform.name().to_string(),
            });
        }
        self.transforms.push(transform);
        Ok(())
    }

    /// Run every registered transform; returns the names that ran.
    pub fn apply(
        &self,
        resource_type: ResourceType,
        name: &str,
        inputs: &mut Props,
        options: &mut ResourceOptions,
    ) -> Vec<String> {
        self.transforms
            .iter()
            .map(|t| {
                t.transform(TransformTarget {
                    resource_type,
                    name,
                    inputs: &mut *inputs,
                    options: &mut *options,
                });
                t.name().to_string()
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
