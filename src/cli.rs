//! CLI argument parsing for inspecting scenario plans.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "scenario",
    version,
    about = "Resolve and inspect scenario-driven test plans",
    after_help = "Examples:\n  scenario plan --scenario smoke\n  scenario plan --root ./app --scenario nightly --json\n  scenario validate --scenario smoke\n  scenario config > sut/harness.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Plan(PlanArgs),
    Validate(ValidateArgs),
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Print a scenario's resolved plan in execution order")]
pub struct PlanArgs {
    /// Project root containing sut/scenarios
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Scenario to resolve
    #[arg(long, value_name = "NAME")]
    pub scenario: String,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Check that a scenario and every test it selects are well formed")]
pub struct ValidateArgs {
    /// Project root containing sut/scenarios
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Scenario to validate
    #[arg(long, value_name = "NAME")]
    pub scenario: String,
}

#[derive(Parser, Debug)]
#[command(about = "Print the harness config (defaults when no root is given)")]
pub struct ConfigArgs {
    /// Project root whose effective config should be printed
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}
