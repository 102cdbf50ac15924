//! colorchain-gen: write a queue file for a whole experiment.

mod plan;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plan::Plan;

/// Generate a colorchain queue file from a JSON experiment plan.
#[derive(Parser, Debug)]
#[command(name = "colorchain-gen", about = "Generate a colorchain queue file")]
struct Args {
    /// JSON experiment plan
    #[arg(short, long)]
    plan: PathBuf,

    /// Queue file to write
    #[arg(short, long, default_value = "to_eval")]
    output: PathBuf,

    /// Do not create the variant output directories
    #[arg(long)]
    no_mkdir: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let plan = match Plan::load(&args.plan) {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "Failed to load plan");
            return ExitCode::FAILURE;
        }
    };

    if !args.no_mkdir {
        if let Err(e) = plan.create_output_dirs() {
            error!(error = %e, "Failed to create output directories");
            return ExitCode::FAILURE;
        }
    }

    match plan.write_queue(&args.output) {
        Ok(count) => {
            info!(jobs = count, queue = %args.output.display(), "Queue file written");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to write queue file");
            ExitCode::FAILURE
        }
    }
}
