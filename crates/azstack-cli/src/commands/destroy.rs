//! `azstack destroy`: delete a stack's resources, newest first.

use azstack_core::application::ApplicationError;
use tracing::{info, instrument};

use crate::{
    cli::{DestroyArgs, GlobalArgs},
    commands::{Workspace, confirm},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(program = %args.target.program))]
pub fn execute(
    args: DestroyArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let service = ws.service()?;
    let context = ws.context(&args.target)?;
    let stack = context.stack_ref();

    // Fails with StackNotFound before anyone is asked.
    let count = service
        .state(stack)?
        .map(|s| s.resources.len())
        .ok_or_else(|| {
            CliError::Core(
                ApplicationError::StackNotFound {
                    stack: stack.to_string(),
                }
                .into(),
            )
        })?;

    if !args.yes {
        let prompt = format!("Destroy {count} resource(s) in {stack}?");
        if !confirm(&prompt, "destroy")? {
            info!("Destroy cancelled");
            return Err(CliError::Cancelled);
        }
    }

    let spinner = output.spinner(format!("Destroying {stack}"));
    let result = service.destroy(stack);
    spinner.finish_and_clear();
    let summary = result?;

    if output.is_json() {
        output.json(&summary)?;
        return Ok(());
    }
    for urn in &summary.deleted {
        output.print(&format!("  - {urn}"))?;
    }
    output.success(&format!(
        "Destroyed {} ({} resource(s) deleted)",
        summary.stack,
        summary.deleted.len()
    ))?;
    Ok(())
}
