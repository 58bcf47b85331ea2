use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Name of the simulation executable under `<install_dir>/bin`.
pub const EXECUTABLE_NAME: &str = "nexus";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("simulation executable not found at {0}")]
    MissingExecutable(PathBuf),
    #[error("failed to spawn {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("simulation exited with {status} for init macro {init_path}")]
    Failed {
        status: ExitStatus,
        init_path: PathBuf,
    },
}

/// Invokes the external simulation synchronously: `<exe> -b -n 1 <init>`,
/// batch mode, a single iteration, the calling environment inherited
/// unmodified. Blocks until the process exits; a non-zero exit is fatal.
/// Nothing is captured from stdout or stderr.
pub struct SimulationRunner {
    executable: PathBuf,
}

impl SimulationRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn from_install_dir(install_dir: impl AsRef<Path>) -> Self {
        Self::new(install_dir.as_ref().join("bin").join(EXECUTABLE_NAME))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn run(&self, init_path: &Path) -> Result<(), RunnerError> {
        if !self.executable.is_file() {
            return Err(RunnerError::MissingExecutable(self.executable.clone()));
        }

        let status = Command::new(&self.executable)
            .arg("-b")
            .arg("-n")
            .arg("1")
            .arg(init_path)
            .status()
            .map_err(|source| RunnerError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::Failed {
                status,
                init_path: init_path.to_path_buf(),
            })
        }
    }
}
