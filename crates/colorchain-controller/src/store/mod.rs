//! Lineage store: the shared directory tree seen as a key-value store.
//!
//! All racy filesystem access goes through [`LineageStore`]. Deletions and
//! renames never fail on a missing source: several controllers may race to
//! clean up the same stale file and "already gone" is a normal outcome.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::path::{Path, PathBuf};

use colorchain_core::MarkerKey;
use serde::Serialize;
use thiserror::Error;

/// Store errors. A missing file is never one of them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(PathBuf),
}

/// Outcome of a best-effort delete or rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOp {
    Applied,
    AlreadyAbsent,
}

/// Marker and artifact operations used by the state transition engine.
pub trait LineageStore: Send + Sync {
    /// Path of the marker file for `key`.
    fn marker_path(&self, key: &MarkerKey) -> PathBuf;

    /// Append one line to the marker for `key`, creating it if needed.
    ///
    /// The append happens under an exclusive lock on the marker so that
    /// concurrent controllers never interleave partial lines.
    fn append_marker(&self, key: &MarkerKey, line: &str) -> Result<PathBuf, StoreError>;

    fn remove_marker(&self, key: &MarkerKey) -> Result<FileOp, StoreError>;

    /// Full contents of a result artifact.
    fn read_artifact(&self, path: &Path) -> Result<String, StoreError>;

    fn remove_artifact(&self, path: &Path) -> Result<FileOp, StoreError>;

    fn rename_artifact(&self, from: &Path, to: &Path) -> Result<FileOp, StoreError>;
}
