//! In-memory lineage store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use colorchain_core::MarkerKey;

use super::{FileOp, LineageStore, StoreError};

/// Lineage store keeping every file in a map keyed by path.
///
/// Markers are stored under `to_run_dir` exactly as [`super::FsStore`]
/// would name them, so paths can be compared across both implementations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    to_run_dir: PathBuf,
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new(to_run_dir: impl Into<PathBuf>) -> Self {
        Self {
            to_run_dir: to_run_dir.into(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, String>> {
        // A poisoned map is still consistent: every mutation is a single insert/remove.
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create or overwrite a file.
    pub fn put(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files().insert(path.into(), contents.into());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.files().get(path).cloned()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().keys().cloned().collect()
    }
}

impl LineageStore for MemoryStore {
    fn marker_path(&self, key: &MarkerKey) -> PathBuf {
        self.to_run_dir.join(key.file_name())
    }

    fn append_marker(&self, key: &MarkerKey, line: &str) -> Result<PathBuf, StoreError> {
        let path = self.marker_path(key);
        let mut files = self.files();
        let contents = files.entry(path.clone()).or_default();
        contents.push_str(line);
        contents.push('\n');
        Ok(path)
    }

    fn remove_marker(&self, key: &MarkerKey) -> Result<FileOp, StoreError> {
        self.remove_artifact(&self.marker_path(key))
    }

    fn read_artifact(&self, path: &Path) -> Result<String, StoreError> {
        self.get(path)
            .ok_or_else(|| StoreError::ArtifactNotFound(path.to_path_buf()))
    }

    fn remove_artifact(&self, path: &Path) -> Result<FileOp, StoreError> {
        Ok(match self.files().remove(path) {
            Some(_) => FileOp::Applied,
            None => FileOp::AlreadyAbsent,
        })
    }

    fn rename_artifact(&self, from: &Path, to: &Path) -> Result<FileOp, StoreError> {
        let mut files = self.files();
        Ok(match files.remove(from) {
            Some(contents) => {
                files.insert(to.to_path_buf(), contents);
                FileOp::Applied
            }
            None => FileOp::AlreadyAbsent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_lifecycle() {
        let store = MemoryStore::new("to_run");
        let key = MarkerKey::new("le450_25c", 5, 30, "head");

        let path = store.append_marker(&key, "./gc --nb_colors 30").unwrap();
        assert_eq!(path, PathBuf::from("to_run/le450_25c_5_30_head"));
        assert_eq!(store.get(&path).as_deref(), Some("./gc --nb_colors 30\n"));

        assert_eq!(store.remove_marker(&key).unwrap(), FileOp::Applied);
        assert_eq!(store.remove_marker(&key).unwrap(), FileOp::AlreadyAbsent);
    }

    #[test]
    fn test_rename_moves_contents() {
        let store = MemoryStore::new("to_run");
        store.put("o/x_1_2.csv", "data");

        let from = Path::new("o/x_1_2.csv");
        let to = Path::new("o/x_1.csv");
        assert_eq!(store.rename_artifact(from, to).unwrap(), FileOp::Applied);
        assert!(!store.contains(from));
        assert_eq!(store.read_artifact(to).unwrap(), "data");
        assert_eq!(store.rename_artifact(from, to).unwrap(), FileOp::AlreadyAbsent);
    }
}
