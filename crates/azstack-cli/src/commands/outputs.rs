//! `azstack outputs`: print a stack's recorded outputs.

use crate::{
    cli::{GlobalArgs, OutputsArgs},
    commands::Workspace,
    config::AppConfig,
    error::{CliError, CliResult},
    output::{OutputManager, display_value},
};

pub fn execute(
    args: OutputsArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let service = ws.service()?;
    let stack = ws.context(&args.target)?.stack_ref().clone();
    let outputs = service.outputs(&stack, args.show_secrets)?;

    if let Some(name) = &args.name {
        let value = outputs.get(name).ok_or_else(|| CliError::InvalidInput {
            message: format!("stack {stack} has no output '{name}'"),
            source: None,
        })?;
        if output.is_json() {
            output.json(value)?;
        } else {
            output.data(&display_value(value))?;
        }
        return Ok(());
    }

    if output.is_json() {
        output.json(&outputs)?;
        return Ok(());
    }
    if outputs.is_empty() {
        output.info(&format!("Stack {stack} has no outputs"))?;
        return Ok(());
    }
    output.header(&format!("Outputs of {stack}:"))?;
    output.key_values(outputs.iter().map(|(k, v)| (k.as_str(), v)))?;
    Ok(())
}
