//! Artifact and marker naming rules.
//!
//! Result artifacts are named `<instance>_<seed>_<colors>.csv`. The color
//! count is always the last underscore-delimited, extension-stripped token of
//! the file name, so predecessor, successor and canonical names are all
//! derived from that one token.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Subdirectory holding the turn-by-turn logs next to the primary artifacts.
pub const TBT_DIR: &str = "tbt";

/// File suffix of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSuffix {
    /// `.csv`, a live or finalized artifact.
    Csv,
    /// `.csv.error`, an artifact whose solution was rejected.
    CsvError,
}

impl ArtifactSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::CsvError => ".csv.error",
        }
    }
}

/// Identity of one attempt in a lineage, and the name of its marker file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerKey {
    pub instance: String,
    pub seed: u64,
    pub nb_colors: u32,
    pub variant: String,
}

impl MarkerKey {
    pub fn new(instance: impl Into<String>, seed: u64, nb_colors: u32, variant: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            seed,
            nb_colors,
            variant: variant.into(),
        }
    }

    /// Same lineage, another color count.
    pub fn with_nb_colors(&self, nb_colors: u32) -> Self {
        Self {
            nb_colors,
            ..self.clone()
        }
    }

    /// `<instance>_<seed>_<colors>_<variant>`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.instance, self.seed, self.nb_colors, self.variant
        )
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Split a file name into the part before its color token and the token.
fn split_color_token(file_name: &str) -> Result<(&str, u32), CoreError> {
    let invalid = || CoreError::InvalidArtifactName(file_name.to_string());
    let (prefix, tail) = file_name.rsplit_once('_').ok_or_else(invalid)?;
    let token = tail.split('.').next().unwrap_or(tail);
    let color = token.parse::<u32>().map_err(|_| invalid())?;
    Ok((prefix, color))
}

fn file_name_of(path: &Path) -> Result<&str, CoreError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CoreError::InvalidArtifactName(path.display().to_string()))
}

/// Color count encoded in an artifact name.
pub fn artifact_color(path: &Path) -> Result<u32, CoreError> {
    split_color_token(file_name_of(path)?).map(|(_, color)| color)
}

/// Name of the artifact `color_delta` colors away from `base`, in the same
/// directory.
///
/// `derive_artifact_name("d/x_3_12.csv", -1, Csv)` is `d/x_3_11.csv`.
pub fn derive_artifact_name(
    base: &Path,
    color_delta: i64,
    suffix: ArtifactSuffix,
) -> Result<PathBuf, CoreError> {
    let file_name = file_name_of(base)?;
    let (prefix, color) = split_color_token(file_name)?;
    let shifted = i64::from(color)
        .checked_add(color_delta)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            CoreError::InvalidArtifactName(format!("{} shifted by {}", file_name, color_delta))
        })?;
    Ok(base.with_file_name(format!("{}_{}{}", prefix, shifted, suffix.as_str())))
}

/// Finalized name: the color token is dropped.
///
/// `canonical_artifact_name("d/x_3_42.csv", Csv)` is `d/x_3.csv`.
pub fn canonical_artifact_name(base: &Path, suffix: ArtifactSuffix) -> Result<PathBuf, CoreError> {
    let (prefix, _) = split_color_token(file_name_of(base)?)?;
    Ok(base.with_file_name(format!("{}{}", prefix, suffix.as_str())))
}

/// Turn-by-turn counterpart: same file name, inside the `tbt` subdirectory.
pub fn tbt_counterpart(base: &Path) -> Result<PathBuf, CoreError> {
    let file_name = file_name_of(base)?;
    let parent = base.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(TBT_DIR).join(file_name))
}
