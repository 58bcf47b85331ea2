use std::path::PathBuf;

use thiserror::Error;

use crate::macro_file::{MacroFileError, MacroGenerator};
use crate::runner::{RunnerError, SimulationRunner};
use crate::scenario::{resolve_run, Scenario};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    MacroFile(#[from] MacroFileError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Directories and installation location the harness operates on. The
/// config and output directories come from the caller's fixtures; the
/// install dir is where the simulation was built.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub install_dir: PathBuf,
}

/// Paths produced by one generate-and-run cycle. `output_path` is where the
/// simulation was told to write; the harness never creates that file itself.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub base_name: String,
    pub run_label: Option<String>,
    pub init_path: PathBuf,
    pub config_path: PathBuf,
    pub output_path: PathBuf,
}

/// Orchestrates one scenario at a time: render macro pair → write → invoke
/// the simulation → report artifact paths. Fully sequential; a multi-run
/// scenario repeats the whole cycle once per run label and stops at the
/// first failure.
pub struct Harness {
    generator: MacroGenerator,
    runner: SimulationRunner,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            generator: MacroGenerator::new(&config.config_dir, &config.output_dir),
            runner: SimulationRunner::from_install_dir(&config.install_dir),
        }
    }

    pub fn generator(&self) -> &MacroGenerator {
        &self.generator
    }

    /// Write the macro pair for one run without invoking the simulation.
    pub fn prepare_run(
        &self,
        scenario: &Scenario,
        run: Option<&str>,
        base_template: &str,
    ) -> Result<RunArtifacts, HarnessError> {
        let base_name = resolve_run(base_template, run);
        let pair = self.generator.write_pair(scenario, run, &base_name)?;
        Ok(RunArtifacts {
            output_path: self.generator.output_path(&base_name),
            base_name,
            run_label: run.map(|label| label.to_string()),
            init_path: pair.init_path,
            config_path: pair.config_path,
        })
    }

    /// Generate and run every run of a scenario in declared order. The base
    /// template may carry a `{run}` slot; without one, multi-run scenarios
    /// would overwrite their own macro files run after run.
    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        base_template: &str,
    ) -> Result<Vec<RunArtifacts>, HarnessError> {
        let mut artifacts = Vec::new();
        for run in scenario.run_labels() {
            let run_artifacts = self.prepare_run(scenario, run, base_template)?;
            self.runner.run(&run_artifacts.init_path)?;
            artifacts.push(run_artifacts);
        }
        Ok(artifacts)
    }
}
