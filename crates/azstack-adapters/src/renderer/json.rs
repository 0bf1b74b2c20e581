//! Pretty JSON rendering of previews.

use azstack_core::{
    application::{ApplicationError, Preview, ports::ManifestRenderer},
    error::CoreResult,
};
use tracing::instrument;

/// Renders a [`Preview`] as indented JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestRenderer {
    compact: bool,
}

impl JsonManifestRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { compact: true }
    }
}

impl ManifestRenderer for JsonManifestRenderer {
    #[instrument(skip_all, fields(stack = %preview.stack, steps = preview.steps.len()))]
    fn render(&self, preview: &Preview) -> CoreResult<String> {
        let rendered = if self.compact {
            serde_json::to_string(preview)
        } else {
            serde_json::to_string_pretty(preview)
        };
        rendered.map_err(|e| {
            ApplicationError::RenderFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}
