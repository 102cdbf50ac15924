//! Test doubles for the process seam.

use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::launcher::{CapturedOutput, Invocation, LaunchError, ProcessLauncher};

/// Launcher answering from a fixed script.
///
/// The first rule whose pattern occurs in the rendered command line wins.
/// Unmatched invocations fail to spawn, as a missing binary would.
#[derive(Default)]
pub struct ScriptedLauncher {
    rules: Vec<(String, CapturedOutput)>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, pattern: impl Into<String>, output: CapturedOutput) -> Self {
        self.rules.push((pattern.into(), output));
        self
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessLauncher for ScriptedLauncher {
    async fn launch(&self, invocation: &Invocation) -> Result<CapturedOutput, LaunchError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let rendered = invocation.to_string();
        self.rules
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| LaunchError::Spawn {
                command: rendered,
                source: io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
            })
    }
}
