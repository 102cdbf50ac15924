//! Result extraction from solver artifacts.
//!
//! Artifact layout (1-based lines):
//! - 1–2: metadata, ignored
//! - 3: CSV header, e.g. `turn,time,nb_uncolored,penalty,nb_colors,solution`
//! - 4..N−1: progress rows in header order
//! - N: closing sentinel (final elapsed time), ignored
//!
//! The last progress row (line N−1) is the reported result.

use serde::{Deserialize, Serialize};

use crate::params::{ParamMap, ParamValue};
use crate::CoreError;

/// 0-based index of the header line.
pub const HEADER_LINE_INDEX: usize = 2;

/// Metadata + header + one progress row + sentinel.
pub const MIN_ARTIFACT_LINES: usize = 5;

pub const COLUMN_TURN: &str = "turn";
pub const COLUMN_TIME: &str = "time";
pub const COLUMN_NB_UNCOLORED: &str = "nb_uncolored";
pub const COLUMN_PENALTY: &str = "penalty";
pub const COLUMN_NB_COLORS: &str = "nb_colors";
pub const COLUMN_SOLUTION: &str = "solution";

/// Last reported state of one solver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Elapsed turns, when reported.
    pub turn: Option<u64>,

    /// Elapsed time, kept verbatim (it is not always an integer).
    pub time: Option<String>,

    pub nb_uncolored: u64,

    pub penalty: u64,

    /// Colors used by the reported solution.
    pub nb_colors: u32,

    /// Solution encoding, only meaningful to the checker.
    pub solution: String,
}

impl RunResult {
    /// Build the typed result from a header/value record.
    pub fn from_record(record: &ParamMap) -> Result<Self, CoreError> {
        let nb_colors = required_int(record, COLUMN_NB_COLORS)?;
        let nb_colors = u32::try_from(nb_colors).map_err(|_| CoreError::InvalidColumn {
            column: COLUMN_NB_COLORS.to_string(),
            value: nb_colors.to_string(),
        })?;

        Ok(Self {
            turn: record.get(COLUMN_TURN).and_then(ParamValue::as_int),
            time: record.get(COLUMN_TIME).map(ToString::to_string),
            nb_uncolored: required_int(record, COLUMN_NB_UNCOLORED)?,
            penalty: required_int(record, COLUMN_PENALTY)?,
            nb_colors,
            solution: record
                .get(COLUMN_SOLUTION)
                .map(ToString::to_string)
                .ok_or_else(|| CoreError::MissingColumn(COLUMN_SOLUTION.to_string()))?,
        })
    }

    /// True when the coloring is legal: nothing uncolored and no penalty.
    pub fn is_legal(&self) -> bool {
        self.nb_uncolored == 0 && self.penalty == 0
    }
}

/// Zip the header with the last progress row, coercing every cell.
pub fn extract_record(contents: &str) -> Result<ParamMap, CoreError> {
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < MIN_ARTIFACT_LINES {
        return Err(CoreError::MalformedArtifact(format!(
            "expected at least {} lines, found {}",
            MIN_ARTIFACT_LINES,
            lines.len()
        )));
    }

    let header = lines[HEADER_LINE_INDEX].trim_end_matches('\r');
    let last_row = lines[lines.len() - 2].trim_end_matches('\r');

    let mut record = ParamMap::new();
    for (column, cell) in header.split(',').zip(last_row.split(',')) {
        record.insert(column, ParamValue::coerce(cell));
    }
    Ok(record)
}

/// Parse a whole artifact into a [`RunResult`].
pub fn extract_result(contents: &str) -> Result<RunResult, CoreError> {
    RunResult::from_record(&extract_record(contents)?)
}

fn required_int(record: &ParamMap, column: &str) -> Result<u64, CoreError> {
    match record.get(column) {
        None => Err(CoreError::MissingColumn(column.to_string())),
        Some(ParamValue::Int(value)) => Ok(*value),
        Some(ParamValue::Text(value)) => Err(CoreError::InvalidColumn {
            column: column.to_string(),
            value: value.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(rows: &[&str]) -> String {
        let mut text = String::from("instance,le450_25c\nseed,5\n");
        text.push_str("turn,time,nb_uncolored,penalty,nb_colors,solution\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.push_str("3600\n");
        text
    }

    #[test]
    fn test_extract_last_progress_row() {
        let contents = artifact(&["10,5,12,3,29,0:1:2", "20,9,0,0,29,0:1:2:3"]);
        let result = extract_result(&contents).unwrap();

        assert_eq!(result.turn, Some(20));
        assert_eq!(result.time.as_deref(), Some("9"));
        assert_eq!(result.nb_uncolored, 0);
        assert_eq!(result.penalty, 0);
        assert_eq!(result.nb_colors, 29);
        assert_eq!(result.solution, "0:1:2:3");
        assert!(result.is_legal());
    }

    #[test]
    fn test_record_matches_coerced_row() {
        let contents = artifact(&["7,1.25,3,4,30,abc"]);
        let record = extract_record(&contents).unwrap();
        let pairs: Vec<(&str, ParamValue)> =
            record.iter().map(|(k, v)| (k, v.clone())).collect();

        assert_eq!(
            pairs,
            vec![
                ("turn", ParamValue::Int(7)),
                ("time", ParamValue::Text("1.25".into())),
                ("nb_uncolored", ParamValue::Int(3)),
                ("penalty", ParamValue::Int(4)),
                ("nb_colors", ParamValue::Int(30)),
                ("solution", ParamValue::Text("abc".into())),
            ]
        );
    }

    #[test]
    fn test_sentinel_is_ignored() {
        let contents = "m\nm\nnb_uncolored,penalty,nb_colors,solution\n1,0,12,x\n99,99,99,sentinel\n";
        let result = extract_result(contents).unwrap();
        assert_eq!(result.nb_uncolored, 1);
        assert_eq!(result.solution, "x");
        assert!(!result.is_legal());
    }

    #[test]
    fn test_crlf_lines() {
        let contents = "m\r\nm\r\nnb_uncolored,penalty,nb_colors,solution\r\n0,0,5,s\r\n12\r\n";
        let result = extract_result(contents).unwrap();
        assert_eq!(result.solution, "s");
        assert_eq!(result.nb_colors, 5);
    }

    #[test]
    fn test_short_artifact_is_malformed() {
        let contents = "m\nm\nnb_uncolored,penalty,nb_colors,solution\n12\n";
        assert!(matches!(
            extract_result(contents),
            Err(CoreError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let contents = "m\nm\nnb_uncolored,nb_colors,solution\n0,5,s\n12\n";
        assert_eq!(
            extract_result(contents),
            Err(CoreError::MissingColumn(COLUMN_PENALTY.into()))
        );
    }

    #[test]
    fn test_non_numeric_penalty() {
        let contents = "m\nm\nnb_uncolored,penalty,nb_colors,solution\n0,n/a,5,s\n12\n";
        assert!(matches!(
            extract_result(contents),
            Err(CoreError::InvalidColumn { .. })
        ));
    }
}
