//! Implementation of the `azstack list` command.

use azstack_adapters::InMemoryProgramStore;
use azstack_core::prelude::ProgramStore;

use crate::{
    cli::{ListArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, output: &OutputManager) -> CliResult<()> {
    let programs = InMemoryProgramStore::with_builtin()?.list()?;

    match args.format {
        ListFormat::Table => {
            output.header("Available Programs:")?;
            let width = programs.iter().map(|p| p.name.len()).max().unwrap_or(0);
            for program in &programs {
                output.print(&format!(
                    "  {:<width$}  {}",
                    program.name, program.description
                ))?;
            }
        }
        ListFormat::Json => output.json(&programs)?,
        ListFormat::List => {
            for program in &programs {
                output.data(&program.name)?;
            }
        }
        ListFormat::Csv => {
            output.data("name,description")?;
            for program in &programs {
                output.data(&format!(
                    "{},\"{}\"",
                    program.name,
                    program.description.replace('"', "\"\"")
                ))?;
            }
        }
    }

    Ok(())
}
