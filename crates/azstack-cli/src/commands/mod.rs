//! Command handlers.
//!
//! Each submodule owns one subcommand.  [`Workspace`] resolves directories
//! and stack identity from flags and config, and wires the adapters into a
//! [`DeploymentService`].

pub mod completions;
pub mod config;
pub mod destroy;
pub mod init;
pub mod list;
pub mod outputs;
pub mod preview;
pub mod stacks;
pub mod up;

use std::path::PathBuf;

use azstack_adapters::{
    CloudIdentity, InMemoryProgramStore, JsonManifestRenderer, LocalStateStore, SimulatedCloud,
    StackConfigLoader, cloud::snapshot_path,
};
use azstack_core::prelude::{CoreError, DeploymentService, StackConfig, StackContext, StateStore};
use tracing::debug;

use crate::{
    cli::{GlobalArgs, ProgramArgs},
    config::AppConfig,
    error::CliResult,
};

/// Resolved locations and identity for one invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub backend_dir: PathBuf,
    pub organization: String,
    pub stack: String,
    pub subscription_id: Option<String>,
}

impl Workspace {
    pub fn resolve(global: &GlobalArgs, config: &AppConfig) -> Self {
        let backend = global
            .backend_dir
            .clone()
            .unwrap_or_else(|| config.backend.dir.clone());
        let backend_dir = if backend.is_absolute() {
            backend
        } else {
            global.dir.join(backend)
        };
        Self {
            dir: global.dir.clone(),
            backend_dir,
            organization: config.defaults.organization.clone(),
            stack: global
                .stack
                .clone()
                .unwrap_or_else(|| config.defaults.stack.clone()),
            subscription_id: config.azure.subscription_id.clone(),
        }
    }

    pub fn state_store(&self) -> LocalStateStore {
        LocalStateStore::new(self.backend_dir.join("state"))
    }

    pub fn loader(&self) -> StackConfigLoader {
        StackConfigLoader::new(&self.dir)
    }

    /// Adapters wired into a service.  The cloud snapshot lives beside state.
    pub fn service(&self) -> CliResult<DeploymentService> {
        let identity = match &self.subscription_id {
            Some(sub) => CloudIdentity::for_subscription(sub),
            None => CloudIdentity::default(),
        };
        let cloud = SimulatedCloud::open(snapshot_path(&self.backend_dir), identity)?;
        debug!(backend = %self.backend_dir.display(), "Opened backend");
        Ok(DeploymentService::new(
            Box::new(InMemoryProgramStore::with_builtin()?),
            Box::new(cloud),
            Box::new(self.state_store()),
            Box::new(JsonManifestRenderer::new()),
        ))
    }

    pub fn context(&self, target: &ProgramArgs) -> CliResult<StackContext> {
        StackContext::new(&self.organization, target.project(), &self.stack)
            .map_err(|e| CoreError::from(e).into())
    }

    /// Merged stack configuration; `fromStack` values read the local state.
    pub fn stack_config(&self, target: &ProgramArgs) -> CliResult<StackConfig> {
        let store = self.state_store();
        Ok(self
            .loader()
            .load(target.project(), &self.stack, Some(&store as &dyn StateStore))?)
    }
}

/// Ask for confirmation on the terminal.
///
/// Without the `interactive` feature, or when stdin is not a terminal, the
/// caller must have passed `--yes`.
pub(crate) fn confirm(prompt: &str, action: &str) -> CliResult<bool> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Err(crate::error::CliError::ConfirmationRequired {
            action: action.into(),
        });
    }

    #[cfg(feature = "interactive")]
    {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| crate::error::CliError::IoError {
                message: "failed to read confirmation".into(),
                source: std::io::Error::other(e),
            })
    }

    #[cfg(not(feature = "interactive"))]
    {
        let _ = prompt;
        Err(crate::error::CliError::FeatureNotAvailable {
            feature: "interactive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::Path;

    fn global(dir: &str, backend: Option<&str>, stack: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
            dir: dir.into(),
            backend_dir: backend.map(PathBuf::from),
            stack: stack.map(String::from),
        }
    }

    #[test]
    fn backend_resolves_against_workspace_dir() {
        let ws = Workspace::resolve(&global("/work", None, None), &AppConfig::default());
        assert_eq!(ws.backend_dir, Path::new("/work/.azstack"));
        assert_eq!(ws.stack, "dev");
        assert_eq!(ws.organization, "organization");
    }

    #[test]
    fn absolute_backend_and_stack_flag_win() {
        let ws = Workspace::resolve(
            &global("/work", Some("/var/state"), Some("prod")),
            &AppConfig::default(),
        );
        assert_eq!(ws.backend_dir, Path::new("/var/state"));
        assert_eq!(ws.stack, "prod");
    }

    #[test]
    fn context_uses_project_override() {
        let ws = Workspace::resolve(&global("/work", None, None), &AppConfig::default());
        let target = ProgramArgs {
            program: "logic-app".into(),
            project: Some("app-esc".into()),
        };
        let ctx = ws.context(&target).unwrap();
        assert_eq!(ctx.stack_ref().to_string(), "organization/app-esc/dev");
    }
}
