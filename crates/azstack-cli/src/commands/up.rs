//! `azstack up`: realize a program's resources and record the stack.

use azstack_core::application::DeploymentEvent;
use serde_json::json;
use tracing::instrument;

use crate::{
    cli::{GlobalArgs, UpArgs},
    commands::Workspace,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(program = %args.target.program))]
pub fn execute(
    args: UpArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let service = ws.service()?;
    let stack_config = ws.stack_config(&args.target)?;
    let context = ws.context(&args.target)?;
    let stack = context.stack_ref().clone();

    let spinner = output.spinner(format!("Updating {stack}"));
    let result = service.up(&args.target.program, context, stack_config);
    spinner.finish_and_clear();
    let summary = result?;

    let outputs = summary.outputs(args.show_secrets);
    if output.is_json() {
        output.json(&json!({
            "stack": summary.stack,
            "created": summary.created,
            "updated_at": summary.updated_at,
            "events": summary.events,
            "outputs": outputs,
        }))?;
        return Ok(());
    }

    for event in &summary.events {
        if let DeploymentEvent::Created {
            resource_type, urn, ..
        } = event
        {
            output.print(&format!("  + {:<44} {}", resource_type.to_string(), urn.name()))?;
        }
    }
    output.success(&format!(
        "Updated {} ({} resource(s) created)",
        summary.stack, summary.created
    ))?;

    if !outputs.is_empty() {
        output.print("")?;
        output.header("Outputs:")?;
        output.key_values(outputs.iter().map(|(k, v)| (k.as_str(), v)))?;
    }
    Ok(())
}
