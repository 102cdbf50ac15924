//! colorchain controller binary.
//!
//! `controller <line_number> <queue_file_path>`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use colorchain_controller::report::{self, Report};
use colorchain_controller::{Controller, ControllerConfig, FsStore, TokioLauncher};

/// Run one queued coloring job and chain or finalize its lineage.
#[derive(Parser, Debug)]
#[command(name = "controller", about = "Run one queued coloring job")]
struct Args {
    /// 1-based line of the queue file to run
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    line_number: u64,

    /// Queue file, one solver command line per line
    queue_file: PathBuf,

    /// Working directory the solver is launched from
    #[arg(long, default_value = "build_release")]
    solver_dir: PathBuf,

    /// Working directory of the checker
    #[arg(long, default_value = "instances")]
    instances_dir: PathBuf,

    /// Directory holding marker files
    #[arg(long, default_value = "to_run")]
    to_run_dir: PathBuf,

    /// Checker command
    #[arg(long, default_value = "python3 check_solution.py")]
    checker: String,

    /// Problem type tag passed to the checker
    #[arg(long, default_value = "gcp")]
    problem_tag: String,

    /// Scheduler submission command
    #[arg(long, default_value = "sbatch scripts/slurm_rerun.sh")]
    scheduler: String,

    /// Prefix of a successful scheduler acknowledgement
    #[arg(long, default_value = "Submitted batch")]
    submitted_prefix: String,

    /// Run and check the solution only, without touching markers or artifacts
    #[arg(long)]
    verify_only: bool,

    /// Print a JSON completion report on stdout
    #[arg(long)]
    json: bool,
}

impl From<&Args> for ControllerConfig {
    fn from(args: &Args) -> Self {
        Self {
            solver_dir: args.solver_dir.clone(),
            instances_dir: args.instances_dir.clone(),
            to_run_dir: args.to_run_dir.clone(),
            checker_command: args.checker.clone(),
            problem_tag: args.problem_tag.clone(),
            scheduler_command: args.scheduler.clone(),
            submitted_prefix: args.submitted_prefix.clone(),
            verify_only: args.verify_only,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Logs go to stderr; stdout is reserved for the JSON report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if args.json {
        report::enable_json_mode();
    }

    let config = ControllerConfig::from(&args);
    let Ok(line_number) = usize::try_from(args.line_number) else {
        error!(line_number = args.line_number, "Line number out of range");
        return ExitCode::FAILURE;
    };

    info!(
        queue = %args.queue_file.display(),
        line_number = line_number,
        verify_only = config.verify_only,
        "Starting colorchain controller"
    );

    let controller = Controller::new(&config, TokioLauncher, FsStore::new(&config.to_run_dir));

    match controller.run(&args.queue_file, line_number).await {
        Ok(completion) => {
            Report::completed(&completion).emit();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Controller failed");
            Report::failed(&e).emit();
            ExitCode::FAILURE
        }
    }
}
