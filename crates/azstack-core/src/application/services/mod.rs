//! Application services - orchestrate use cases.

pub mod deployment_service;
pub mod engine;

pub use deployment_service::{
    DeploymentService, DestroySummary, PlannedStep, Preview, UpdateSummary,
};
pub use engine::{DeploymentEvent, Realization, realize, topological_order};
