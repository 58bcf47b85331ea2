use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Random seed shared by every scenario in the test suite. The value is a
/// fixture of the suite, not something varied per run.
pub const RANDOM_SEED: u32 = 21_051_817;

/// Placeholder expanded to the run label in multi-run scenario text.
pub const RUN_PLACEHOLDER: &str = "{run}";

const SINGLE_PARTICLE_PARAMS: &str = "\
/Generator/SingleParticle/particle e-
/Generator/SingleParticle/min_energy 10. keV
/Generator/SingleParticle/max_energy 10. keV
";

const NEXT100_PARAMS: &str = "\
/Geometry/Next100/elfield true
/Geometry/Next100/EL_field 13 kV/cm
/Geometry/Next100/max_step_size 1. mm
/Geometry/Next100/pressure 15. bar
/Geometry/Next100/sc_yield 10000 1/MeV
";

const NEXT_NEW_PARAMS: &str = "\
/Geometry/NextNew/elfield true
/Geometry/NextNew/EL_field 13 kV/cm
/Geometry/NextNew/max_step_size 1. mm
/Geometry/NextNew/pressure 15. bar
/Geometry/NextNew/sc_yield 10000 1/MeV
";

const NEXT_FLEX_PARAMS: &str = "\
/Geometry/NextFlex/gas                   enrichedXe
/Geometry/NextFlex/gas_pressure          15. bar
/Geometry/NextFlex/gas_temperature       300. kelvin
/Geometry/NextFlex/sc_yield              25510. 1/MeV
/Geometry/NextFlex/e_lifetime            12. ms
/Geometry/NextFlex/active_length         1204.95 mm
/Geometry/NextFlex/active_diam           984.0 mm
/Geometry/NextFlex/drift_transv_diff     1. mm/sqrt(cm)
/Geometry/NextFlex/drift_long_diff       .2 mm/sqrt(cm)
/Geometry/NextFlex/buffer_length         254.6 mm
/Geometry/NextFlex/cathode_transparency  .98
/Geometry/NextFlex/anode_transparency    .88
/Geometry/NextFlex/gate_transparency     .88
/Geometry/NextFlex/el_gap_length         10.  mm
/Geometry/NextFlex/el_field_on           true
/Geometry/NextFlex/el_field_int          16. kilovolt/cm
/Geometry/NextFlex/el_transv_diff        0. mm/sqrt(cm)
/Geometry/NextFlex/el_long_diff          0. mm/sqrt(cm)
/Geometry/NextFlex/fc_wls_mat            TPB
/Geometry/NextFlex/fc_with_fibers        false
/Geometry/NextFlex/fiber_mat             EJ280
/Geometry/NextFlex/fiber_claddings       2
/Geometry/NextFlex/fiber_sensor_time_binning  25. ns
/Geometry/NextFlex/ep_with_PMTs          true
/Geometry/NextFlex/ep_with_teflon        false
/Geometry/NextFlex/ep_copper_thickness   12. cm
/Geometry/NextFlex/ep_wls_mat            TPB
/Geometry/PmtR11410/time_binning         25. ns
/Geometry/NextFlex/tp_copper_thickness   12. cm
/Geometry/NextFlex/tp_teflon_thickness   2.1 mm
/Geometry/NextFlex/tp_teflon_hole_diam   7. mm
/Geometry/NextFlex/tp_wls_mat            TPB
/Geometry/NextFlex/tp_kapton_anode_dist  15. mm
/Geometry/NextFlex/tp_sipm_sizeX         1.3 mm
/Geometry/NextFlex/tp_sipm_sizeY         1.3 mm
/Geometry/NextFlex/tp_sipm_sizeZ         2.0 mm
/Geometry/NextFlex/tp_sipm_pitchX        15.55 mm
/Geometry/NextFlex/tp_sipm_pitchY        15.55 mm
/Geometry/NextFlex/tp_sipm_time_binning  1. microsecond
/Geometry/NextFlex/ics_thickness         12. cm
";

const NEXT_DEMO_PARAMS: &str = "\
/Geometry/NextDemo/config {run}
/Geometry/NextDemo/elfield true
/Geometry/NextDemo/EL_field_intensity 13 kV/cm
/Geometry/NextDemo/max_step_size 1. mm
/Geometry/NextDemo/pressure 10. bar
/Geometry/NextDemo/sc_yield 10000 1/MeV
";

fn default_generator() -> String {
    "SingleParticleGenerator".to_string()
}

fn default_em_verbose() -> bool {
    true
}

fn default_save_strings() -> bool {
    true
}

fn default_appendix() -> String {
    SINGLE_PARTICLE_PARAMS.to_string()
}

/// One detector-geometry test case: everything the macro generator needs to
/// render an init/config pair, minus the directories and base name the caller
/// supplies.
///
/// `config_body` and `appendix` are opaque directive blocks embedded verbatim
/// in the config macro; no validation of parameter values or units happens
/// here. Both may contain `{run}`, which is substituted with the run label in
/// multi-run scenarios.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Geometry module registered in the init macro.
    pub geometry: String,
    /// Generator module registered in the init macro.
    #[serde(default = "default_generator")]
    pub generator: String,
    /// Directives placed between the verbosity header and the persistency
    /// section, in the order the simulation expects them.
    #[serde(default)]
    pub config_body: String,
    /// Parameter blocks appended after the random seed directive.
    #[serde(default = "default_appendix")]
    pub appendix: String,
    /// Whether the config macro carries a `/process/em/verbose 0` line.
    #[serde(default = "default_em_verbose")]
    pub em_verbose: bool,
    /// Value of the `/nexus/persistency/save_strings` directive.
    #[serde(default = "default_save_strings")]
    pub save_strings: bool,
    /// Run labels for multi-run scenarios; empty means a single run.
    #[serde(default)]
    pub runs: Vec<String>,
}

impl Scenario {
    pub fn next100() -> Self {
        Self {
            name: "next100".to_string(),
            geometry: "Next100OpticalGeometry".to_string(),
            generator: default_generator(),
            config_body: "/Generator/SingleParticle/region CENTER\n".to_string(),
            appendix: format!("{NEXT100_PARAMS}\n{SINGLE_PARTICLE_PARAMS}"),
            em_verbose: true,
            save_strings: true,
            runs: Vec::new(),
        }
    }

    pub fn next_new() -> Self {
        Self {
            name: "new".to_string(),
            geometry: "NextNew".to_string(),
            generator: default_generator(),
            config_body: format!("{NEXT_NEW_PARAMS}\n/Generator/SingleParticle/region CENTER\n"),
            appendix: default_appendix(),
            em_verbose: true,
            save_strings: true,
            runs: Vec::new(),
        }
    }

    pub fn flex100() -> Self {
        Self {
            name: "flex100".to_string(),
            geometry: "NextFlex".to_string(),
            generator: default_generator(),
            config_body: format!(
                "{NEXT_FLEX_PARAMS}\n\
                 /Generator/SingleParticle/region         AD_HOC\n\
                 /Geometry/NextFlex/specific_vertex       0. 0. 500. mm\n"
            ),
            appendix: default_appendix(),
            em_verbose: true,
            save_strings: true,
            runs: Vec::new(),
        }
    }

    pub fn demopp() -> Self {
        Self {
            name: "demopp".to_string(),
            geometry: "NextDemo".to_string(),
            generator: default_generator(),
            config_body: format!(
                "{NEXT_DEMO_PARAMS}\n\
                 /Geometry/NextDemo/specific_vertex 0. 0. 10. cm\n\n\
                 /Generator/SingleParticle/region AD_HOC\n"
            ),
            appendix: default_appendix(),
            em_verbose: false,
            save_strings: true,
            runs: ["run5", "run7", "run8", "run9", "run10"]
                .iter()
                .map(|run| run.to_string())
                .collect(),
        }
    }

    pub fn no_strings() -> Self {
        Self {
            name: "no_strings".to_string(),
            save_strings: false,
            ..Self::next100()
        }
    }

    /// The built-in scenario set, in the order the suite executes it. Later
    /// consumers expect earlier scenarios' output files to exist, so the
    /// order is part of the contract.
    pub fn builtin() -> Vec<Scenario> {
        vec![
            Self::next100(),
            Self::next_new(),
            Self::flex100(),
            Self::demopp(),
            Self::no_strings(),
        ]
    }

    /// Run labels to iterate: `[None]` for single-run scenarios.
    pub fn run_labels(&self) -> Vec<Option<&str>> {
        if self.runs.is_empty() {
            vec![None]
        } else {
            self.runs.iter().map(|run| Some(run.as_str())).collect()
        }
    }

    /// Default base file name; multi-run scenarios get a `{run}` slot so each
    /// run writes a distinct pair.
    pub fn default_base_name(&self) -> String {
        if self.runs.is_empty() {
            format!("{}.nexus", self.name)
        } else {
            format!("{}.{RUN_PLACEHOLDER}.nexus", self.name)
        }
    }
}

/// Expand the `{run}` placeholder, leaving the text untouched for single-run
/// scenarios.
pub fn resolve_run(text: &str, run: Option<&str>) -> String {
    match run {
        Some(label) => text.replace(RUN_PLACEHOLDER, label),
        None => text.to_string(),
    }
}

/// Loads extra scenario descriptors from YAML files relative to a base
/// directory. Built-in scenarios do not go through this path.
pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}
