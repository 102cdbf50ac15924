//! colorchain Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Child processes
//! - The cluster scheduler
//! - The shared filesystem layout
//!
//! Everything here describes one attempt in a coloring lineage: the queued
//! job, the parsed solver result, the artifact naming rules and the outcome
//! classification that decides whether a lineage is chained or finalized.

pub mod error;
pub mod job;
pub mod naming;
pub mod outcome;
pub mod params;
pub mod result;

// Re-export commonly used types
pub use error::CoreError;
pub use job::JobSpec;
pub use naming::{derive_artifact_name, ArtifactSuffix, MarkerKey};
pub use outcome::{classify, ControllerState, Decision, TerminalState, VerificationOutcome};
pub use params::{parse_command_line, ParamMap, ParamValue};
pub use result::{extract_result, RunResult};
