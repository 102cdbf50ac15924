//! Outcome classifier and state transition engine.
//!
//! One invocation runs exactly one queued job:
//!
//! ```text
//! queue line -> JobSpec -> solver -> RunResult -> classify
//!     RETRY  -> drop stale files, write next marker, submit   => Requeued
//!     VERIFY -> checker -> accepted: drop marker, finalize     => Finalized
//!                       -> rejected: keep marker, mark .error  => Errored
//! ```
//!
//! Mutations are ordered so the most failure-tolerant ones (deletions of
//! files that may already be gone) come first. Nothing is rolled back.

use std::path::{Path, PathBuf};

use colorchain_core::job::FLAG_NB_COLORS;
use colorchain_core::naming::{canonical_artifact_name, tbt_counterpart};
use colorchain_core::{
    classify, derive_artifact_name, extract_result, ArtifactSuffix, ControllerState, CoreError,
    Decision, JobSpec, RunResult, TerminalState, VerificationOutcome,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::launcher::ProcessLauncher;
use crate::queue::read_queue_line;
use crate::runner::SolverRunner;
use crate::scheduler::{Scheduler, SubmissionAck};
use crate::store::{FileOp, LineageStore};
use crate::verifier::Verifier;

/// Colors added to the budget after an infeasible attempt.
pub const RETRY_COLOR_STEP: u32 = 1;

/// Color offset of the stale primary artifact removed on RETRY.
pub const STALE_RESULT_DELTA: i64 = -1;

/// Color offset of the stale turn-by-turn artifact removed on RETRY.
pub const STALE_TBT_DELTA: i64 = -1;

/// How a controller invocation finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Completion {
    /// The queue has no such line.
    NothingToDo,

    /// RETRY: a follow-up attempt was recorded and submitted.
    Requeued {
        next_job: JobSpec,
        marker: PathBuf,
        ack: SubmissionAck,
    },

    /// VERIFY succeeded: artifacts carry their canonical names.
    Finalized { artifact: PathBuf, tbt: PathBuf },

    /// VERIFY failed: artifacts renamed with the error suffix, marker kept.
    Errored {
        artifact: PathBuf,
        tbt: PathBuf,
        verification: VerificationOutcome,
    },

    /// Verify-only mode: the result was checked, nothing was mutated.
    Checked {
        result: RunResult,
        verification: VerificationOutcome,
    },
}

impl Completion {
    pub fn terminal_state(&self) -> Option<TerminalState> {
        match self {
            Self::Requeued { .. } => Some(TerminalState::Requeued),
            Self::Finalized { .. } => Some(TerminalState::Finalized),
            Self::Errored { .. } => Some(TerminalState::Errored),
            Self::NothingToDo | Self::Checked { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ArtifactKind {
    Result,
    Tbt,
}

/// Drives one job through the control loop.
pub struct Controller<L, S> {
    launcher: L,
    store: S,
    runner: SolverRunner,
    verifier: Verifier,
    scheduler: Scheduler,
    verify_only: bool,
}

impl<L, S> Controller<L, S>
where
    L: ProcessLauncher,
    S: LineageStore,
{
    pub fn new(config: &ControllerConfig, launcher: L, store: S) -> Self {
        Self {
            launcher,
            store,
            runner: SolverRunner::new(&config.solver_dir),
            verifier: Verifier::new(
                &config.checker_command,
                &config.instances_dir,
                &config.problem_tag,
            ),
            scheduler: Scheduler::new(&config.scheduler_command, &config.submitted_prefix),
            verify_only: config.verify_only,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run line `line_number` of the queue file.
    pub async fn run(
        &self,
        queue_path: &Path,
        line_number: usize,
    ) -> Result<Completion, ControllerError> {
        let Some(line) = read_queue_line(queue_path, line_number).await? else {
            info!(
                queue = %queue_path.display(),
                line_number = line_number,
                "No queued job at this line, nothing to do"
            );
            return Ok(Completion::NothingToDo);
        };
        self.run_line(&line).await
    }

    /// Run one raw queue line.
    pub async fn run_line(&self, line: &str) -> Result<Completion, ControllerError> {
        let job = JobSpec::parse_line(line)?;
        info!(
            instance = %job.instance,
            seed = job.rand_seed,
            nb_colors = job.nb_colors,
            variant = %job.variant(),
            "Starting attempt"
        );

        let output = self.runner.run(&self.launcher, line).await?;
        let contents = self.store.read_artifact(&output)?;
        let result = extract_result(&contents)?;

        let mut state = ControllerState::RunComplete;
        debug!(
            state = ?state,
            nb_uncolored = result.nb_uncolored,
            penalty = result.penalty,
            nb_colors = result.nb_colors,
            "Result extracted"
        );

        if self.verify_only {
            return Ok(self.check_only(&job, result).await);
        }

        let decision = classify(&result);
        state = ControllerState::after_decision(decision);
        info!(state = ?state, artifact = %output.display(), "Run classified");

        let completion = match decision {
            Decision::Retry => self.retry(&job, &output).await?,
            Decision::Verify => self.verify(&job, &output, &result).await?,
        };

        if let Some(terminal) = completion.terminal_state() {
            state = ControllerState::Done(terminal);
        }
        info!(state = ?state, "Attempt handled");
        Ok(completion)
    }

    /// RETRY: the budget was infeasible, chain an attempt with one more color.
    async fn retry(&self, job: &JobSpec, output: &Path) -> Result<Completion, ControllerError> {
        let next_colors = job.nb_colors.checked_add(RETRY_COLOR_STEP).ok_or_else(|| {
            CoreError::InvalidParameter {
                flag: FLAG_NB_COLORS.to_string(),
                value: job.nb_colors.to_string(),
            }
        })?;
        let next_job = job.with_nb_colors(next_colors);
        info!(
            instance = %job.instance,
            seed = job.rand_seed,
            from = job.nb_colors,
            to = next_colors,
            "Color budget infeasible, loosening"
        );

        let op = self.store.remove_marker(&job.marker_key())?;
        debug!(marker = %job.marker_key(), op = ?op, "Removed current marker");

        self.remove_stale(output, STALE_RESULT_DELTA, ArtifactKind::Result)?;
        self.remove_stale(output, STALE_TBT_DELTA, ArtifactKind::Tbt)?;

        let marker = self
            .store
            .append_marker(&next_job.marker_key(), &next_job.to_command_line())?;
        info!(marker = %marker.display(), "Recorded follow-up job");

        let ack = self.scheduler.submit(&self.launcher, &marker).await;

        Ok(Completion::Requeued {
            next_job,
            marker,
            ack,
        })
    }

    /// Delete the artifact `delta` colors away from `output`, if any.
    fn remove_stale(
        &self,
        output: &Path,
        delta: i64,
        kind: ArtifactKind,
    ) -> Result<(), ControllerError> {
        let stale = derive_artifact_name(output, delta, ArtifactSuffix::Csv).and_then(|path| {
            match kind {
                ArtifactKind::Result => Ok(path),
                ArtifactKind::Tbt => tbt_counterpart(&path),
            }
        });
        let stale = match stale {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, kind = ?kind, "Skipping stale artifact cleanup");
                return Ok(());
            }
        };

        let op = self.store.remove_artifact(&stale)?;
        debug!(path = %stale.display(), kind = ?kind, op = ?op, "Stale artifact cleanup");
        Ok(())
    }

    /// VERIFY: check the claimed solution, then finalize or mark as error.
    async fn verify(
        &self,
        job: &JobSpec,
        output: &Path,
        result: &RunResult,
    ) -> Result<Completion, ControllerError> {
        let verification = self
            .verifier
            .verify(&self.launcher, &job.instance, result.nb_colors, &result.solution)
            .await;
        let tbt = tbt_counterpart(output)?;

        if verification.is_accepted() {
            let op = self.store.remove_marker(&job.marker_key())?;
            debug!(marker = %job.marker_key(), op = ?op, "Removed marker");

            let artifact = self.rename_canonical(output, ArtifactSuffix::Csv)?;
            let tbt = self.rename_canonical(&tbt, ArtifactSuffix::Csv)?;
            info!(
                instance = %job.instance,
                seed = job.rand_seed,
                nb_colors = result.nb_colors,
                artifact = %artifact.display(),
                "Solution verified, artifacts finalized"
            );
            return Ok(Completion::Finalized { artifact, tbt });
        }

        error!(
            command = %job.to_command_line(),
            marker = %job.marker_key(),
            "Verification failed, keeping marker for inspection"
        );
        let artifact = self.rename_canonical(output, ArtifactSuffix::CsvError)?;
        let tbt = self.rename_canonical(&tbt, ArtifactSuffix::CsvError)?;
        Ok(Completion::Errored {
            artifact,
            tbt,
            verification,
        })
    }

    async fn check_only(&self, job: &JobSpec, result: RunResult) -> Completion {
        let verification = self
            .verifier
            .verify(&self.launcher, &job.instance, result.nb_colors, &result.solution)
            .await;
        info!(
            instance = %job.instance,
            nb_colors = result.nb_colors,
            accepted = verification.is_accepted(),
            "Verify-only run checked"
        );
        Completion::Checked {
            result,
            verification,
        }
    }

    fn rename_canonical(
        &self,
        path: &Path,
        suffix: ArtifactSuffix,
    ) -> Result<PathBuf, ControllerError> {
        let target = canonical_artifact_name(path, suffix)?;
        let op = self.store.rename_artifact(path, &target)?;
        if op == FileOp::AlreadyAbsent {
            debug!(path = %path.display(), "Artifact already gone, nothing to rename");
        }
        Ok(target)
    }
}
