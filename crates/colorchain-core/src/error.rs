//! Core domain errors.

use thiserror::Error;

/// Core domain errors for colorchain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A flag was the last token of the line, with no value after it.
    #[error("Flag '{flag}' has no value (corrupted queue line?)")]
    MissingValue { flag: String },

    /// A required flag is absent from the queue line.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A flag carries a value of the wrong shape.
    #[error("Invalid value '{value}' for parameter {flag}")]
    InvalidParameter { flag: String, value: String },

    /// The result artifact does not follow the reporting protocol.
    #[error("Malformed result artifact: {0}")]
    MalformedArtifact(String),

    /// A required column is absent from the artifact header.
    #[error("Result artifact has no '{0}' column")]
    MissingColumn(String),

    /// A column holds a value that cannot be interpreted.
    #[error("Invalid value '{value}' in column '{column}'")]
    InvalidColumn { column: String, value: String },

    /// An artifact file name does not end with a numeric color token.
    #[error("Artifact name '{0}' has no trailing color token")]
    InvalidArtifactName(String),
}
