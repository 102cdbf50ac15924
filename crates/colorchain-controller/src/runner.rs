//! Solver execution.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::ControllerError;
use crate::launcher::{Invocation, ProcessLauncher};

/// Runs the solver from its build directory and returns the artifact path.
#[derive(Debug, Clone)]
pub struct SolverRunner {
    working_dir: PathBuf,
}

impl SolverRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Execute the queued command line.
    ///
    /// Anything on the solver's stderr, or an empty stdout, is fatal. The
    /// trimmed stdout is the artifact path, resolved against the
    /// controller's own working directory.
    pub async fn run<L>(&self, launcher: &L, command_line: &str) -> Result<PathBuf, ControllerError>
    where
        L: ProcessLauncher + ?Sized,
    {
        let invocation = Invocation::from_command_line(command_line)?.in_dir(&self.working_dir);
        info!(command = %invocation, working_dir = %self.working_dir.display(), "Running solver");

        let output = launcher.launch(&invocation).await?;

        if let Some(diagnostic) = output.diagnostic() {
            error!(diagnostic = %diagnostic.trim_end(), command = %command_line.trim_end(), "error while running job");
            return Err(ControllerError::SolverDiagnostic {
                diagnostic: diagnostic.to_string(),
                command: command_line.trim_end().to_string(),
            });
        }

        if !output.success() {
            warn!(exit_code = ?output.exit_code, "Solver exited with a failure status but no diagnostic");
        }

        let output_path = output.stdout.trim();
        if output_path.is_empty() {
            error!(command = %command_line.trim_end(), "error: no output file returned");
            return Err(ControllerError::MissingOutputPath {
                command: command_line.trim_end().to_string(),
            });
        }

        info!(artifact = %output_path, "Solver finished");
        Ok(PathBuf::from(output_path))
    }
}
