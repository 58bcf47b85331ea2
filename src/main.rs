use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use nexus_harness::{
    harness::{Harness, HarnessConfig},
    scenario::{Scenario, ScenarioLoader},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Integration-test harness for the nexus simulation")]
struct Cli {
    /// nexus installation directory (defaults to $NEXUSDIR)
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Directory for generated macro files
    #[arg(long, default_value = "macros")]
    config_dir: PathBuf,

    /// Directory the simulation writes output files into
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Scenario names to run (all built-in scenarios, in order, when omitted)
    #[arg(long)]
    scenario: Vec<String>,

    /// Extra scenario descriptor YAML files, appended after the built-ins
    #[arg(long)]
    scenario_file: Vec<PathBuf>,

    /// Base file name; {run} expands to the run label in multi-run scenarios
    #[arg(long)]
    base_name: Option<String>,

    /// Write macro files without invoking the simulation
    #[arg(long)]
    generate_only: bool,
}

fn install_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.install_dir {
        return Ok(dir.clone());
    }
    match env::var_os("NEXUSDIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => bail!("no installation directory: pass --install-dir or set NEXUSDIR"),
    }
}

fn select_scenarios(cli: &Cli) -> Result<Vec<Scenario>> {
    let loader = ScenarioLoader::new(".");
    let mut scenarios = Scenario::builtin();
    for file in &cli.scenario_file {
        scenarios.push(loader.load(file)?);
    }

    if cli.scenario.is_empty() {
        return Ok(scenarios);
    }
    for name in &cli.scenario {
        if !scenarios.iter().any(|s| &s.name == name) {
            bail!("unknown scenario '{name}'");
        }
    }
    scenarios.retain(|s| cli.scenario.contains(&s.name));
    Ok(scenarios)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let install_dir = install_dir(&cli)?;
    let scenarios = select_scenarios(&cli)?;

    fs::create_dir_all(&cli.config_dir)
        .with_context(|| format!("Failed to create {}", cli.config_dir.display()))?;
    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;

    let harness = Harness::new(HarnessConfig {
        config_dir: cli.config_dir.clone(),
        output_dir: cli.output_dir.clone(),
        install_dir,
    });

    for scenario in &scenarios {
        let base_template = cli
            .base_name
            .clone()
            .unwrap_or_else(|| scenario.default_base_name());

        if cli.generate_only {
            for run in scenario.run_labels() {
                let artifacts = harness.prepare_run(scenario, run, &base_template)?;
                println!(
                    "Scenario '{}': wrote {} and {}",
                    scenario.name,
                    artifacts.init_path.display(),
                    artifacts.config_path.display()
                );
            }
            continue;
        }

        let runs = harness
            .run_scenario(scenario, &base_template)
            .with_context(|| format!("Scenario '{}' failed", scenario.name))?;
        for artifacts in &runs {
            println!(
                "Scenario '{}'{} completed. Output expected at {}",
                scenario.name,
                artifacts
                    .run_label
                    .as_deref()
                    .map(|run| format!(" ({run})"))
                    .unwrap_or_default(),
                artifacts.output_path.display()
            );
        }
    }
    Ok(())
}
