pub mod harness;
pub mod macro_file;
pub mod runner;
pub mod scenario;

pub use harness::{Harness, HarnessConfig, HarnessError, RunArtifacts};
pub use macro_file::{MacroGenerator, MacroPair};
pub use runner::{RunnerError, SimulationRunner};
pub use scenario::{Scenario, ScenarioLoader, RANDOM_SEED};
