//! `azstack preview`: run a program and show what `up` would create.

use tracing::instrument;

use crate::{
    cli::{GlobalArgs, PreviewArgs},
    commands::Workspace,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(program = %args.target.program))]
pub fn execute(
    args: PreviewArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let service = ws.service()?;
    let stack_config = ws.stack_config(&args.target)?;
    let preview = service.preview(&args.target.program, ws.context(&args.target)?, stack_config)?;

    if output.is_json() {
        output.data(&service.render(&preview)?)?;
        return Ok(());
    }

    output.header(&format!("Previewing {} ({})", preview.stack, preview.program))?;
    for step in &preview.steps {
        let mut line = format!("  + {:<44} {}", step.resource_type.to_string(), step.name);
        if step.protect {
            line.push_str("  [protected]");
        }
        output.print(&line)?;
    }

    if !preview.outputs.is_empty() {
        output.print("")?;
        output.header("Outputs:")?;
        output.key_values(preview.outputs.iter().map(|(k, v)| (k.as_str(), v)))?;
    }

    output.print("")?;
    output.info(&format!("{} resource(s) to create", preview.steps.len()))?;
    Ok(())
}
