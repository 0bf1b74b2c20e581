//! `azstack stacks`: stacks with recorded state.

use serde_json::json;

use crate::{
    cli::GlobalArgs, commands::Workspace, config::AppConfig, error::CliResult,
    output::OutputManager,
};

pub fn execute(global: &GlobalArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let ws = Workspace::resolve(global, config);
    let service = ws.service()?;
    let stacks = service.stacks()?;

    if output.is_json() {
        let rows: Vec<_> = stacks
            .iter()
            .map(|s| {
                let state = service.state(s).ok().flatten();
                json!({
                    "stack": s,
                    "resources": state.as_ref().map(|st| st.resources.len()),
                    "updated_at": state.as_ref().map(|st| st.updated_at),
                })
            })
            .collect();
        output.json(&rows)?;
        return Ok(());
    }

    if stacks.is_empty() {
        output.info(&format!("No stacks recorded in {}", ws.backend_dir.display()))?;
        return Ok(());
    }

    output.header("Stacks:")?;
    for stack in &stacks {
        let detail = match service.state(stack)? {
            Some(state) => format!(
                "{} resource(s), updated {}",
                state.resources.len(),
                state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => "no state".into(),
        };
        output.print(&format!("  {:<40} {detail}", stack.to_string()))?;
    }
    Ok(())
}
