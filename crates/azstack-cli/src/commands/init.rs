//! `azstack init`: write a starter stack file for a program.

use azstack_adapters::builtin_programs::stack_template;
use azstack_core::application::ApplicationError;
use tracing::info;

use crate::{
    cli::{GlobalArgs, InitArgs},
    commands::Workspace,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    args: InitArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let template = stack_template(&args.target.program).ok_or_else(|| {
        CliError::Core(
            ApplicationError::ProgramNotFound {
                name: args.target.program.clone(),
            }
            .into(),
        )
    })?;
    // Validates the project and stack names.
    ws.context(&args.target)?;

    let loader = ws.loader();
    let path = loader.stack_file(args.target.project(), &ws.stack);
    if path.exists() && !args.force {
        return Err(CliError::StackFileExists { path });
    }

    let path = loader.write_stack_file(args.target.project(), &ws.stack, template, true)?;
    info!(path = %path.display(), "Wrote stack file");
    output.success(&format!("Created {}", path.display()))?;
    output.info(&format!(
        "Edit it, then run: azstack up {} --stack {}",
        args.target.program, ws.stack
    ))?;
    Ok(())
}
