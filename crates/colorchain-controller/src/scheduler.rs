//! Cluster scheduler submission.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::launcher::{Invocation, ProcessLauncher};

/// Scheduler acknowledgement. A mismatch is reported, never fatal: the
/// marker is already on disk and can be submitted again by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionAck {
    Submitted { job_id: Option<String> },
    Unexpected { output: String },
}

impl SubmissionAck {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    command: String,
    submitted_prefix: String,
}

impl Scheduler {
    pub fn new(command: impl Into<String>, submitted_prefix: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            submitted_prefix: submitted_prefix.into(),
        }
    }

    /// Interpret the scheduler's stdout.
    ///
    /// `Submitted batch job 4242` yields job id `4242`.
    pub fn parse_ack(&self, output: &str) -> SubmissionAck {
        if !output.starts_with(&self.submitted_prefix) {
            return SubmissionAck::Unexpected {
                output: output.to_string(),
            };
        }
        let job_id = output
            .split_whitespace()
            .last()
            .filter(|token| token.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string);
        SubmissionAck::Submitted { job_id }
    }

    /// Submit a marker file as a new scheduler job.
    pub async fn submit<L>(&self, launcher: &L, marker: &Path) -> SubmissionAck
    where
        L: ProcessLauncher + ?Sized,
    {
        let invocation = Invocation::shell(format!("{} {}", self.command, marker.display()));
        let ack = match launcher.launch(&invocation).await {
            Ok(output) => self.parse_ack(&output.stdout),
            Err(e) => SubmissionAck::Unexpected {
                output: e.to_string(),
            },
        };

        match &ack {
            SubmissionAck::Submitted { job_id } => {
                info!(marker = %marker.display(), job_id = ?job_id, "Follow-up job submitted");
            }
            SubmissionAck::Unexpected { output } => {
                warn!(marker = %marker.display(), output = %output, "Unexpected scheduler acknowledgement");
            }
        }
        ack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::CapturedOutput;
    use crate::testing::ScriptedLauncher;

    fn scheduler() -> Scheduler {
        Scheduler::new("sbatch scripts/slurm_rerun.sh", "Submitted batch")
    }

    #[test]
    fn test_parse_ack() {
        assert_eq!(
            scheduler().parse_ack("Submitted batch job 4242\n"),
            SubmissionAck::Submitted {
                job_id: Some("4242".to_string())
            }
        );
        assert_eq!(
            scheduler().parse_ack("Submitted batch"),
            SubmissionAck::Submitted { job_id: None }
        );
        assert_eq!(
            scheduler().parse_ack("sbatch: error: invalid partition\n"),
            SubmissionAck::Unexpected {
                output: "sbatch: error: invalid partition\n".to_string()
            }
        );
        assert!(!scheduler().parse_ack("").is_submitted());
    }

    #[tokio::test]
    async fn test_submit_runs_through_shell() {
        let launcher = ScriptedLauncher::new()
            .respond("slurm_rerun.sh", CapturedOutput::from_stdout("Submitted batch job 7\n"));
        let ack = scheduler()
            .submit(&launcher, Path::new("to_run/a_1_4_v"))
            .await;

        assert!(ack.is_submitted());
        let calls = launcher.calls();
        assert_eq!(calls[0].program, "sh");
        assert_eq!(
            calls[0].args,
            vec!["-c", "sbatch scripts/slurm_rerun.sh to_run/a_1_4_v"]
        );
    }

    #[tokio::test]
    async fn test_submit_failure_is_not_fatal() {
        let ack = scheduler()
            .submit(&ScriptedLauncher::new(), Path::new("to_run/a_1_4_v"))
            .await;
        assert!(matches!(ack, SubmissionAck::Unexpected { .. }));
    }
}
