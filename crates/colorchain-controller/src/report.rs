//! JSON completion report on stdout.
//!
//! With `--json`, the controller prints exactly one JSON line describing how
//! the invocation ended, for wrappers that collect lineage statistics.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::engine::Completion;
use crate::error::ControllerError;

/// Global flag to enable JSON output mode.
static JSON_MODE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable JSON output mode.
pub fn enable_json_mode() {
    JSON_MODE_ENABLED.store(true, Ordering::SeqCst);
}

/// Check if JSON mode is enabled.
pub fn is_json_mode() -> bool {
    JSON_MODE_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Completed,
    Failed,
}

/// A single report line.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl Report {
    pub fn new(kind: ReportKind, data: serde_json::Value) -> Self {
        Self {
            kind,
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    pub fn completed(completion: &Completion) -> Self {
        let data = serde_json::to_value(completion)
            .unwrap_or_else(|e| serde_json::json!({ "serialization_error": e.to_string() }));
        Self::new(ReportKind::Completed, data)
    }

    pub fn failed(error: &ControllerError) -> Self {
        Self::new(
            ReportKind::Failed,
            serde_json::json!({ "error": error.to_string() }),
        )
    }

    /// Print this report as a JSON line, if JSON mode is on.
    pub fn emit(&self) {
        if !is_json_mode() {
            return;
        }
        if let Ok(json) = serde_json::to_string(self) {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", json);
            let _ = stdout.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_completed_report_shape() {
        let completion = Completion::Finalized {
            artifact: PathBuf::from("out/head/le450_25c_5.csv"),
            tbt: PathBuf::from("out/head/tbt/le450_25c_5.csv"),
        };
        let report = Report::completed(&completion);

        assert_eq!(report.kind, ReportKind::Completed);
        assert_eq!(report.data["outcome"], "finalized");
        assert_eq!(report.data["artifact"], "out/head/le450_25c_5.csv");
        assert!(!report.timestamp.is_empty());
    }

    #[test]
    fn test_nothing_to_do_report() {
        let report = Report::completed(&Completion::NothingToDo);
        assert_eq!(report.data, serde_json::json!({ "outcome": "nothing_to_do" }));
    }

    #[test]
    fn test_failed_report() {
        let error = ControllerError::MissingOutputPath {
            command: "./gc --instance a".to_string(),
        };
        let report = Report::failed(&error);
        assert_eq!(report.kind, ReportKind::Failed);
        assert!(report.data["error"]
            .as_str()
            .unwrap()
            .contains("no output file returned"));
    }
}
