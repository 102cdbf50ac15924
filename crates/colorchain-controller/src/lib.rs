//! colorchain controller.
//!
//! Runs one queued solver job, classifies its result and either chains a
//! follow-up attempt with a looser color budget or verifies and finalizes the
//! solution. Many controllers run at once on a cluster; they coordinate only
//! through marker files in the shared directory tree.

pub mod config;
pub mod engine;
pub mod error;
pub mod launcher;
pub mod queue;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod store;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use config::ControllerConfig;
pub use engine::{Completion, Controller};
pub use error::ControllerError;
pub use launcher::{ProcessLauncher, TokioLauncher};
pub use store::{FsStore, LineageStore, MemoryStore};
