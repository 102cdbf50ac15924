//! Verification adapter around the external checker.
//!
//! The checker's contract is silence on success. Whatever it prints means
//! the solution cannot be trusted, whether the solution is wrong or the
//! checker itself was mis-invoked.

use std::path::PathBuf;

use colorchain_core::VerificationOutcome;
use tracing::{error, info};

use crate::launcher::{CapturedOutput, Invocation, LaunchError, ProcessLauncher};

#[derive(Debug, Clone)]
pub struct Verifier {
    command: String,
    working_dir: PathBuf,
    problem_tag: String,
}

impl Verifier {
    pub fn new(
        command: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        problem_tag: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            problem_tag: problem_tag.into(),
        }
    }

    /// `<checker> <instance> <problem_tag> <nb_colors> <solution>`, run from
    /// the instance directory.
    pub fn invocation(
        &self,
        instance: &str,
        nb_colors: u32,
        solution: &str,
    ) -> Result<Invocation, LaunchError> {
        Ok(Invocation::from_command_line(&self.command)?
            .arg(instance)
            .arg(self.problem_tag.as_str())
            .arg(nb_colors.to_string())
            .arg(solution)
            .in_dir(&self.working_dir))
    }

    pub async fn verify<L>(
        &self,
        launcher: &L,
        instance: &str,
        nb_colors: u32,
        solution: &str,
    ) -> VerificationOutcome
    where
        L: ProcessLauncher + ?Sized,
    {
        let invocation = match self.invocation(instance, nb_colors, solution) {
            Ok(invocation) => invocation,
            Err(e) => {
                return VerificationOutcome::ToolFailure {
                    diagnostic: e.to_string(),
                }
            }
        };
        info!(instance = %instance, nb_colors = nb_colors, checker = %self.command, "Checking solution");

        let outcome = match launcher.launch(&invocation).await {
            Ok(output) => interpret(output),
            Err(e) => VerificationOutcome::ToolFailure {
                diagnostic: e.to_string(),
            },
        };
        if let Some(diagnostic) = outcome.diagnostic() {
            error!(diagnostic = %diagnostic.trim_end(), command = %invocation, "error when checking solution");
        }
        outcome
    }
}

/// Silence and a clean exit is the only acceptance.
fn interpret(output: CapturedOutput) -> VerificationOutcome {
    if let Some(diagnostic) = output.diagnostic() {
        return VerificationOutcome::ToolFailure {
            diagnostic: diagnostic.to_string(),
        };
    }
    if !output.stdout.is_empty() {
        return VerificationOutcome::Rejected {
            diagnostic: output.stdout,
        };
    }
    if !output.success() {
        return VerificationOutcome::ToolFailure {
            diagnostic: format!("checker exited with status {:?}", output.exit_code),
        };
    }
    VerificationOutcome::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLauncher;

    fn verifier() -> Verifier {
        Verifier::new("python3 check_solution.py", "instances", "gcp")
    }

    #[test]
    fn test_invocation_shape() {
        let inv = verifier().invocation("le450_25c", 29, "0:1:2").unwrap();
        assert_eq!(inv.program, "python3");
        assert_eq!(
            inv.args,
            vec!["check_solution.py", "le450_25c", "gcp", "29", "0:1:2"]
        );
        assert_eq!(inv.working_dir, Some(PathBuf::from("instances")));
    }

    #[tokio::test]
    async fn test_silence_is_acceptance() {
        let launcher = ScriptedLauncher::new().respond("check_solution.py", CapturedOutput::silent());
        let outcome = verifier().verify(&launcher, "a", 3, "s").await;
        assert_eq!(outcome, VerificationOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_stdout_is_rejection() {
        let launcher = ScriptedLauncher::new()
            .respond("check_solution.py", CapturedOutput::from_stdout("conflict on edge 3-4\n"));
        let outcome = verifier().verify(&launcher, "a", 3, "s").await;
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected {
                diagnostic: "conflict on edge 3-4\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_stderr_is_tool_failure() {
        let launcher = ScriptedLauncher::new().respond(
            "check_solution.py",
            CapturedOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "Traceback (most recent call last)".to_string(),
            },
        );
        let outcome = verifier().verify(&launcher, "a", 3, "s").await;
        assert!(matches!(outcome, VerificationOutcome::ToolFailure { .. }));
    }

    #[tokio::test]
    async fn test_silent_non_zero_exit_is_tool_failure() {
        let launcher = ScriptedLauncher::new().respond(
            "check_solution.py",
            CapturedOutput {
                exit_code: Some(2),
                ..CapturedOutput::default()
            },
        );
        let outcome = verifier().verify(&launcher, "a", 3, "s").await;
        assert!(matches!(outcome, VerificationOutcome::ToolFailure { .. }));
    }

    #[tokio::test]
    async fn test_launch_failure_is_tool_failure() {
        let launcher = ScriptedLauncher::new();
        let outcome = verifier().verify(&launcher, "a", 3, "s").await;
        assert!(matches!(outcome, VerificationOutcome::ToolFailure { .. }));
    }
}
