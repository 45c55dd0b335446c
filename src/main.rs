use anyhow::{Context, Result};
use clap::Parser;
use scenario_harness::config::{config_stub, load_config_or_default, HarnessConfig};
use scenario_harness::console::{Console, TerminalConsole};
use scenario_harness::paths::HarnessPaths;
use scenario_harness::scenarios::{resolve_plan, FsScenarioSource, ResolvedTestCase, TestPlan};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Command, ConfigArgs, PlanArgs, RootArgs, ValidateArgs};

#[derive(Serialize)]
struct PlanReport<'a> {
    scenario: &'a str,
    tests: Vec<PlanEntry<'a>>,
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    order: i64,
    key: String,
    composite_id: &'a str,
    scenario: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xfail: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a Value>,
}

impl<'a> PlanEntry<'a> {
    fn new(case: &'a ResolvedTestCase) -> Self {
        Self {
            order: case.order,
            key: case.key.to_string(),
            composite_id: case.composite_id(),
            scenario: &case.scenario,
            skip: case.record.skip,
            xfail: case.record.xfail,
            params: case.record.params.as_ref(),
        }
    }
}

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Plan(args) => cmd_plan(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn load_plan(root: &Path, scenario: &str) -> Result<(HarnessConfig, TestPlan)> {
    let config = load_config_or_default(root)
        .with_context(|| format!("load harness config under {}", root.display()))?;
    let paths = HarnessPaths::new(root.to_path_buf());
    let source = FsScenarioSource::new(paths.scenarios_dir(&config));
    let plan =
        resolve_plan(&source, scenario).with_context(|| format!("resolve scenario {scenario}"))?;
    Ok((config, plan))
}

fn cmd_plan(args: PlanArgs) -> Result<()> {
    let (config, plan) = load_plan(&args.root, &args.scenario)?;
    let tests: Vec<PlanEntry<'_>> = plan.in_order().into_iter().map(PlanEntry::new).collect();

    if args.json {
        let report = PlanReport {
            scenario: plan.scenario(),
            tests,
        };
        let text = serde_json::to_string_pretty(&report).context("serialize plan report")?;
        println!("{text}");
        return Ok(());
    }

    let mut console = TerminalConsole::new(io::stdout(), config.banner_width);
    console.sep('=', &format!("scenario {}", plan.scenario()))?;
    for entry in &tests {
        let mut line = format!("{:>4}  {}", entry.order, entry.key);
        if entry.skip == Some(true) {
            line.push_str("  [skip]");
        }
        if entry.xfail == Some(true) {
            line.push_str("  [xfail]");
        }
        line.push('\n');
        console.write(&line)?;
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let (_, plan) = load_plan(&args.root, &args.scenario)?;
    let mut functions = BTreeSet::new();
    for case in plan.in_order() {
        case.params()?;
        case.fixture_binding()?;
        case.skip()?;
        case.xfail()?;
        functions.insert(&case.key.function);
    }
    println!(
        "scenario '{}' is valid: {} tests across {} functions",
        plan.scenario(),
        plan.len(),
        functions.len()
    );
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    let Some(root) = args.root else {
        println!("{}", config_stub());
        return Ok(());
    };
    let config = load_config_or_default(&root)
        .with_context(|| format!("load harness config under {}", root.display()))?;
    let text = serde_json::to_string_pretty(&config).context("serialize harness config")?;
    println!("{text}");
    Ok(())
}
