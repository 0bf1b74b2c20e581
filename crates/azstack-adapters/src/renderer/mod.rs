//! Manifest renderers.

pub mod json;

pub use json::JsonManifestRenderer;
