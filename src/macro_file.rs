use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scenario::{resolve_run, Scenario, RANDOM_SEED};

/// Fixed registration block opening every init macro. Scenario-specific
/// registrations follow it, always in geometry → generator → macro order.
const COMMON_INIT_PARAMS: &str = "\
/PhysicsList/RegisterPhysics G4EmStandardPhysics_option4
/PhysicsList/RegisterPhysics G4DecayPhysics
/PhysicsList/RegisterPhysics G4RadioactiveDecayPhysics
/PhysicsList/RegisterPhysics G4OpticalPhysics
/PhysicsList/RegisterPhysics NexusPhysics
/PhysicsList/RegisterPhysics G4StepLimiterPhysics

/nexus/RegisterTrackingAction DefaultTrackingAction
/nexus/RegisterEventAction DefaultEventAction
/nexus/RegisterRunAction DefaultRunAction

/nexus/RegisterPersistencyManager PersistencyManager
";

#[derive(Debug, Error)]
pub enum MacroFileError {
    #[error("failed to write macro file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths of one generated init/config pair.
#[derive(Debug, Clone)]
pub struct MacroPair {
    pub init_path: PathBuf,
    pub config_path: PathBuf,
}

/// Renders init and config macro text for a scenario and writes the pair
/// into the configuration directory.
///
/// Rendering is deterministic: identical inputs produce byte-identical text.
/// Existing files at the target paths are silently overwritten.
pub struct MacroGenerator {
    config_dir: PathBuf,
    output_dir: PathBuf,
}

impl MacroGenerator {
    pub fn new(config_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn init_path(&self, base_name: &str) -> PathBuf {
        self.config_dir.join(format!("{base_name}.init.mac"))
    }

    pub fn config_path(&self, base_name: &str) -> PathBuf {
        self.config_dir.join(format!("{base_name}.config.mac"))
    }

    /// The exact value embedded in the `/nexus/persistency/output_file`
    /// directive. Downstream assertions against the simulation output must
    /// use this path, or the test is unverifiable.
    pub fn output_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(base_name)
    }

    pub fn render_init(&self, scenario: &Scenario, base_name: &str) -> String {
        let mut text = String::new();
        text.push_str(COMMON_INIT_PARAMS);
        text.push('\n');
        text.push_str(&format!("/nexus/RegisterGeometry {}\n", scenario.geometry));
        text.push('\n');
        text.push_str(&format!("/nexus/RegisterGenerator {}\n", scenario.generator));
        text.push('\n');
        text.push_str(&format!(
            "/nexus/RegisterMacro {}\n",
            self.config_path(base_name).display()
        ));
        text
    }

    pub fn render_config(&self, scenario: &Scenario, run: Option<&str>, base_name: &str) -> String {
        let mut text = String::new();
        text.push_str("/run/verbose 1\n");
        text.push_str("/event/verbose 0\n");
        text.push_str("/tracking/verbose 0\n");
        text.push('\n');
        if scenario.em_verbose {
            text.push_str("/process/em/verbose 0\n");
            text.push('\n');
        }
        text.push_str(&resolve_run(&scenario.config_body, run));
        text.push('\n');
        text.push_str(&format!(
            "/nexus/persistency/save_strings {}\n",
            scenario.save_strings
        ));
        text.push_str(&format!(
            "/nexus/persistency/output_file {}\n",
            self.output_path(base_name).display()
        ));
        text.push_str(&format!("/nexus/random_seed {RANDOM_SEED}\n"));
        text.push('\n');
        text.push_str(&resolve_run(&scenario.appendix, run));
        text
    }

    /// Write the init/config pair for one run of a scenario. `base_name`
    /// must already have its run label substituted.
    pub fn write_pair(
        &self,
        scenario: &Scenario,
        run: Option<&str>,
        base_name: &str,
    ) -> Result<MacroPair, MacroFileError> {
        let init_path = self.init_path(base_name);
        let config_path = self.config_path(base_name);

        write_text(&init_path, &self.render_init(scenario, base_name))?;
        write_text(&config_path, &self.render_config(scenario, run, base_name))?;

        Ok(MacroPair {
            init_path,
            config_path,
        })
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), MacroFileError> {
    fs::write(path, text).map_err(|source| MacroFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> MacroGenerator {
        MacroGenerator::new("/cfg", "/out")
    }

    #[test]
    fn init_registers_modules_in_order() {
        let text = generator().render_init(&Scenario::next100(), "next100.nexus");
        let positions: Vec<usize> = [
            "/PhysicsList/RegisterPhysics G4EmStandardPhysics_option4",
            "/PhysicsList/RegisterPhysics G4DecayPhysics",
            "/PhysicsList/RegisterPhysics G4RadioactiveDecayPhysics",
            "/PhysicsList/RegisterPhysics G4OpticalPhysics",
            "/PhysicsList/RegisterPhysics NexusPhysics",
            "/PhysicsList/RegisterPhysics G4StepLimiterPhysics",
            "/nexus/RegisterTrackingAction DefaultTrackingAction",
            "/nexus/RegisterEventAction DefaultEventAction",
            "/nexus/RegisterRunAction DefaultRunAction",
            "/nexus/RegisterPersistencyManager PersistencyManager",
            "/nexus/RegisterGeometry Next100OpticalGeometry",
            "/nexus/RegisterGenerator SingleParticleGenerator",
            "/nexus/RegisterMacro /cfg/next100.nexus.config.mac",
        ]
        .iter()
        .map(|line| text.find(line).unwrap_or_else(|| panic!("missing {line}")))
        .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] < pair[1]),
            "registration lines out of order in:\n{text}"
        );
    }

    #[test]
    fn config_embeds_output_path_and_seed() {
        let macros = generator();
        let text = macros.render_config(&Scenario::next100(), None, "next100.nexus");
        assert!(text.contains("/nexus/persistency/save_strings true"));
        assert!(text.contains("/nexus/persistency/output_file /out/next100.nexus"));
        assert!(text.contains("/nexus/random_seed 21051817"));
        assert_eq!(
            macros.output_path("next100.nexus"),
            PathBuf::from("/out/next100.nexus")
        );
    }

    #[test]
    fn no_strings_config_disables_string_saving() {
        let text = generator().render_config(&Scenario::no_strings(), None, "no_strings.nexus");
        assert!(text.contains("/nexus/persistency/save_strings false"));
        assert!(!text.contains("/nexus/persistency/save_strings true"));
    }

    #[test]
    fn demopp_config_carries_run_label() {
        let text = generator().render_config(&Scenario::demopp(), Some("run8"), "demopp.run8.nexus");
        assert!(text.contains("/Geometry/NextDemo/config run8"));
        assert!(text.contains("/nexus/persistency/output_file /out/demopp.run8.nexus"));
        assert!(!text.contains("{run}"));
        assert!(!text.contains("/process/em/verbose"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let macros = generator();
        for scenario in Scenario::builtin() {
            let run = scenario.runs.first().map(|r| r.as_str());
            let base = resolve_run(&scenario.default_base_name(), run);
            assert_eq!(
                macros.render_init(&scenario, &base),
                macros.render_init(&scenario, &base)
            );
            assert_eq!(
                macros.render_config(&scenario, run, &base),
                macros.render_config(&scenario, run, &base)
            );
        }
    }
}
