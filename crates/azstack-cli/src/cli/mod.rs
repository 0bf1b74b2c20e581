//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "azstack",
    bin_name = "azstack",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Declarative Azure stacks with cross-stack outputs",
    long_about = "azstack declares Azure resources as stacks, realizes them against \
                  a cloud backend and passes outputs from one stack to another.",
    after_help = "EXAMPLES:\n\
        \x20 azstack init base-infra --stack dev\n\
        \x20 azstack up base-infra --stack dev\n\
        \x20 azstack up logic-app --stack dev\n\
        \x20 azstack outputs logic-app endpoint",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show what `up` would create, without touching the cloud.
    #[command(
        about = "Preview a stack",
        after_help = "EXAMPLES:\n\
            \x20 azstack preview base-infra\n\
            \x20 azstack preview logic-app --stack prod --output-format json"
    )]
    Preview(PreviewArgs),

    /// Create every declared resource and record the stack's outputs.
    #[command(
        about = "Create or update a stack",
        after_help = "EXAMPLES:\n\
            \x20 azstack up base-infra\n\
            \x20 azstack up logic-app --project app-esc --show-secrets"
    )]
    Up(UpArgs),

    /// Delete every resource of a stack.
    #[command(
        about = "Destroy a stack",
        after_help = "EXAMPLES:\n\
            \x20 azstack destroy logic-app --yes"
    )]
    Destroy(DestroyArgs),

    /// Print a stack's recorded outputs.
    #[command(
        about = "Show stack outputs",
        after_help = "EXAMPLES:\n\
            \x20 azstack outputs base-infra\n\
            \x20 azstack outputs logic-app endpoint"
    )]
    Outputs(OutputsArgs),

    /// List stacks with recorded state.
    #[command(about = "List stacks")]
    Stacks,

    /// List available programs.
    #[command(
        visible_alias = "ls",
        about = "List available programs",
        after_help = "EXAMPLES:\n\
            \x20 azstack list\n\
            \x20 azstack list --format json"
    )]
    List(ListArgs),

    /// Write a starter stack file for a program.
    #[command(
        about = "Create a stack file",
        after_help = "EXAMPLES:\n\
            \x20 azstack init base-infra --stack dev\n\
            \x20 azstack init logic-app --stack dev --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 azstack completions bash > ~/.local/share/bash-completion/completions/azstack\n\
            \x20 azstack completions zsh  > ~/.zfunc/_azstack\n\
            \x20 azstack completions fish > ~/.config/fish/completions/azstack.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the azstack configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 azstack config get defaults.stack\n\
            \x20 azstack config set defaults.organization acme\n\
            \x20 azstack config list"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Which program to run and under which project name.
#[derive(Debug, Clone, Args)]
pub struct ProgramArgs {
    /// Program name, e.g. `base-infra` or `logic-app`.
    #[arg(value_name = "PROGRAM", help = "Program to run")]
    pub program: String,

    /// Project name; defaults to the program name.
    #[arg(
        short = 'p',
        long = "project",
        value_name = "NAME",
        help = "Project name (default: program name)"
    )]
    pub project: Option<String>,
}

impl ProgramArgs {
    pub fn project(&self) -> &str {
        self.project.as_deref().unwrap_or(&self.program)
    }
}

// ── preview ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub target: ProgramArgs,
}

// ── up ────────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UpArgs {
    #[command(flatten)]
    pub target: ProgramArgs,

    /// Print secret outputs in clear text.
    #[arg(long = "show-secrets", help = "Show secret outputs")]
    pub show_secrets: bool,
}

// ── destroy ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub target: ProgramArgs,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,
}

// ── outputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OutputsArgs {
    #[command(flatten)]
    pub target: ProgramArgs,

    /// Print only this output's value.
    #[arg(value_name = "NAME", help = "Single output to print")]
    pub name: Option<String>,

    /// Print secret outputs in clear text.
    #[arg(long = "show-secrets", help = "Show secret outputs")]
    pub show_secrets: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `azstack list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `azstack init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub target: ProgramArgs,

    /// Overwrite an existing stack file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing stack file")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `azstack completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `azstack config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.stack`.
        key: String,
    },
    /// Set a configuration key in the configuration file.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_up_command() {
        let cli = Cli::parse_from(["azstack", "up", "base-infra", "--stack", "prod"]);
        assert_eq!(cli.global.stack.as_deref(), Some("prod"));
        match cli.command {
            Commands::Up(args) => {
                assert_eq!(args.target.program, "base-infra");
                assert_eq!(args.target.project(), "base-infra");
                assert!(!args.show_secrets);
            }
            other => panic!("expected Up, got {other:?}"),
        }
    }

    #[test]
    fn project_overrides_program_name() {
        let cli = Cli::parse_from(["azstack", "preview", "logic-app", "-p", "app-esc"]);
        let Commands::Preview(args) = cli.command else {
            panic!("expected Preview");
        };
        assert_eq!(args.target.project(), "app-esc");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["azstack", "stacks", "-C", "/tmp/ws", "-vv"]);
        assert_eq!(cli.global.dir, std::path::PathBuf::from("/tmp/ws"));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["azstack", "--quiet", "--verbose", "stacks"]);
        assert!(result.is_err());
    }

    #[test]
    fn outputs_takes_optional_name() {
        let cli = Cli::parse_from(["azstack", "outputs", "logic-app", "endpoint"]);
        let Commands::Outputs(args) = cli.command else {
            panic!("expected Outputs");
        };
        assert_eq!(args.name.as_deref(), Some("endpoint"));
    }
}
