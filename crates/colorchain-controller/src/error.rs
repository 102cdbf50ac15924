//! Controller errors. Every variant is fatal: the controller exits with 1.

use std::path::PathBuf;

use colorchain_core::CoreError;
use thiserror::Error;

use crate::launcher::LaunchError;
use crate::store::StoreError;

/// Errors that abort a controller invocation.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Malformed queue line or result artifact.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read queue file {path}: {source}")]
    QueueRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The solver wrote to its diagnostic stream.
    #[error("error while running job: {diagnostic}\ncommand: {command}")]
    SolverDiagnostic { diagnostic: String, command: String },

    /// The solver printed no artifact path.
    #[error("no output file returned\ncommand: {command}")]
    MissingOutputPath { command: String },

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
