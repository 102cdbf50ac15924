//! Child process execution.
//!
//! Every external collaborator (solver, checker, scheduler) is a child
//! process that runs to completion with both streams captured. The
//! [`ProcessLauncher`] trait is the seam the engine is tested through.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors that can occur while launching a child process.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fully specified child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Split a command line on whitespace: first token is the program.
    pub fn from_command_line(line: &str) -> Result<Self, LaunchError> {
        let mut tokens = line.split_whitespace();
        let program = tokens.next().ok_or(LaunchError::EmptyCommand)?;
        Ok(Self::new(program).with_args(tokens))
    }

    /// Run `command` through `sh -c`.
    pub fn shell(command: impl Into<String>) -> Self {
        Self::new("sh").with_args(["-c".to_string(), command.into()])
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Everything a finished child process produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Clean exit with nothing on either stream.
    pub fn silent() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// Clean exit with `text` on stdout.
    pub fn from_stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            ..Self::silent()
        }
    }

    /// Diagnostic stream, if the process wrote anything to it.
    pub fn diagnostic(&self) -> Option<&str> {
        if self.stderr.is_empty() {
            None
        } else {
            Some(&self.stderr)
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs child processes to completion.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the invocation and wait for it. No timeout is applied: the
    /// scheduler's own job limit covers hung children.
    async fn launch(&self, invocation: &Invocation) -> Result<CapturedOutput, LaunchError>;
}

/// Launcher backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn launch(&self, invocation: &Invocation) -> Result<CapturedOutput, LaunchError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %invocation, working_dir = ?invocation.working_dir, "Spawning child process");

        let output = cmd.output().await.map_err(|source| LaunchError::Spawn {
            command: invocation.to_string(),
            source,
        })?;

        let captured = CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            command = %invocation,
            exit_code = ?captured.exit_code,
            stdout_len = captured.stdout.len(),
            stderr_len = captured.stderr.len(),
            "Child process exited"
        );
        Ok(captured)
    }
}
