//! Controller configuration.

use std::path::PathBuf;

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Working directory the solver is launched from.
    pub solver_dir: PathBuf,

    /// Working directory of the checker (it expects instance data there).
    pub instances_dir: PathBuf,

    /// Directory holding the marker files.
    pub to_run_dir: PathBuf,

    /// Checker command; instance, problem tag, colors and solution are appended.
    pub checker_command: String,

    /// Problem type tag passed to the checker.
    pub problem_tag: String,

    /// Scheduler submission command; the marker path is appended.
    pub scheduler_command: String,

    /// Prefix of a successful scheduler acknowledgement.
    pub submitted_prefix: String,

    /// Run and check only; never touch markers or artifacts.
    pub verify_only: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            solver_dir: PathBuf::from("build_release"),
            instances_dir: PathBuf::from("instances"),
            to_run_dir: PathBuf::from("to_run"),
            checker_command: "python3 check_solution.py".to_string(),
            problem_tag: "gcp".to_string(),
            scheduler_command: "sbatch scripts/slurm_rerun.sh".to_string(),
            submitted_prefix: "Submitted batch".to_string(),
            verify_only: false,
        }
    }
}
