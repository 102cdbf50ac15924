//! Outcome classification and controller states.

use serde::{Deserialize, Serialize};

use crate::RunResult;

/// What to do with a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// The color budget was infeasible: chain an attempt with one more color.
    Retry,
    /// The run claims a legal coloring: have it checked.
    Verify,
}

/// Decide RETRY vs VERIFY.
///
/// Any uncolored vertex or any penalty, however small, means RETRY.
pub fn classify(result: &RunResult) -> Decision {
    if result.nb_uncolored != 0 || result.penalty != 0 {
        Decision::Retry
    } else {
        Decision::Verify
    }
}

/// Where one controller invocation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalState {
    /// A follow-up marker was written and submitted.
    Requeued,
    /// The solution was accepted and the artifacts renamed to their final name.
    Finalized,
    /// The solution failed verification; artifacts and marker kept for review.
    Errored,
}

/// States of the per-job control loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerState {
    /// Result extracted, not yet classified.
    #[default]
    RunComplete,
    Retry,
    Verify,
    Done(TerminalState),
}

impl ControllerState {
    /// Returns true if the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// State entered after classification.
    pub fn after_decision(decision: Decision) -> Self {
        match decision {
            Decision::Retry => Self::Retry,
            Decision::Verify => Self::Verify,
        }
    }
}

/// Result of running the external checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Checker stayed silent and exited cleanly.
    Accepted,
    /// Checker reported a problem with the solution on stdout.
    Rejected { diagnostic: String },
    /// Checker could not be run, wrote to stderr, or exited non-zero.
    ToolFailure { diagnostic: String },
}

impl VerificationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Diagnostic text for a failed verification.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Rejected { diagnostic } | Self::ToolFailure { diagnostic } => Some(diagnostic),
        }
    }

    /// Terminal state this outcome leads to. Rejection and tool failure are
    /// handled identically.
    pub fn terminal_state(&self) -> TerminalState {
        if self.is_accepted() {
            TerminalState::Finalized
        } else {
            TerminalState::Errored
        }
    }
}
