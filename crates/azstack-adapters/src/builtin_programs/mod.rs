//! The programs that ship with azstack.
//!
//! - [`BaseInfra`] (`base-infra`): resource group, storage account and a Cosmos
//!   DB account with one SQL database and container. Exports the five fields
//!   dependent stacks consume.
//! - [`LogicApp`] (`logic-app`): a Logic App that writes HTTP request bodies
//!   into the base stack's container through a managed API connection.

mod base_infra;
mod logic_app;

use std::sync::Arc;

use azstack_core::application::ports::Program;

pub use base_infra::BaseInfra;
pub use logic_app::LogicApp;

/// Every builtin program, in dependency order.
pub fn all_programs() -> Vec<Arc<dyn Program>> {
    vec![Arc::new(BaseInfra), Arc::new(LogicApp)]
}

/// Starter `Stack.<stack>.toml` for a program, written by `azstack init`.
pub fn stack_template(program: &str) -> Option<&'static str> {
    match program {
        BaseInfra::NAME => Some(
            r#"# Stack configuration for base-infra.
[config]
"azure-native:location" = "westus2"
protect_flag = true
"#,
        ),
        LogicApp::NAME => Some(
            r#"# Stack configuration for logic-app.
[config]
"azure-native:location" = "westus2"
# Read outputs from organization/<baseProjectName>/<this stack>.
baseProjectName = "base-infra"

# Or import them from an environment and set crossStackSource = "config":
# [environment]
# imports = ["base-outputs"]
"#,
        ),
        _ => None,
    }
}
