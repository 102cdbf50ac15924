//! Filesystem-backed lineage store.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colorchain_core::MarkerKey;
use nix::fcntl::{Flock, FlockArg};
use tracing::debug;

use super::{FileOp, LineageStore, StoreError};

/// Store over the real directory tree; markers live in `to_run_dir`.
#[derive(Debug, Clone)]
pub struct FsStore {
    to_run_dir: PathBuf,
}

impl FsStore {
    pub fn new(to_run_dir: impl Into<PathBuf>) -> Self {
        Self {
            to_run_dir: to_run_dir.into(),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Map `NotFound` to [`FileOp::AlreadyAbsent`].
fn tolerate_missing(result: io::Result<()>, path: &Path) -> Result<FileOp, StoreError> {
    match result {
        Ok(()) => Ok(FileOp::Applied),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileOp::AlreadyAbsent),
        Err(e) => Err(io_error(path)(e)),
    }
}

impl LineageStore for FsStore {
    fn marker_path(&self, key: &MarkerKey) -> PathBuf {
        self.to_run_dir.join(key.file_name())
    }

    fn append_marker(&self, key: &MarkerKey, line: &str) -> Result<PathBuf, StoreError> {
        let path = self.marker_path(key);
        fs::create_dir_all(&self.to_run_dir).map_err(io_error(&self.to_run_dir))?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error(&path))?;

        let mut locked = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            StoreError::Lock {
                path: path.clone(),
                source: io::Error::from(errno),
            }
        })?;
        debug!(marker = %path.display(), "Acquired marker lock");

        locked
            .write_all(format!("{}\n", line).as_bytes())
            .and_then(|()| locked.flush())
            .map_err(io_error(&path))?;

        locked.unlock().map_err(|(_, errno)| StoreError::Lock {
            path: path.clone(),
            source: io::Error::from(errno),
        })?;
        Ok(path)
    }

    fn remove_marker(&self, key: &MarkerKey) -> Result<FileOp, StoreError> {
        let path = self.marker_path(key);
        tolerate_missing(fs::remove_file(&path), &path)
    }

    fn read_artifact(&self, path: &Path) -> Result<String, StoreError> {
        fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::ArtifactNotFound(path.to_path_buf())
            } else {
                io_error(path)(source)
            }
        })
    }

    fn remove_artifact(&self, path: &Path) -> Result<FileOp, StoreError> {
        tolerate_missing(fs::remove_file(path), path)
    }

    fn rename_artifact(&self, from: &Path, to: &Path) -> Result<FileOp, StoreError> {
        if !from.exists() {
            return Ok(FileOp::AlreadyAbsent);
        }
        tolerate_missing(fs::rename(from, to), from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn key(colors: u32) -> MarkerKey {
        MarkerKey::new("DSJC500.1", 3, colors, "variantA")
    }

    #[test]
    fn test_append_creates_marker_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("to_run"));

        let path = store.append_marker(&key(13), "./gc --nb_colors 13").unwrap();
        assert_eq!(path, dir.path().join("to_run").join("DSJC500.1_3_13_variantA"));
        store.append_marker(&key(13), "./gc --nb_colors 13").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "./gc --nb_colors 13\n./gc --nb_colors 13\n");
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsStore::new(dir.path()));
        let line = format!("./gc {}", "--flag value ".repeat(200).trim_end());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let line = line.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        store.append_marker(&key(13), &line).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(store.marker_path(&key(13))).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 160);
        assert!(lines.iter().all(|l| *l == line));
    }

    #[test]
    fn test_remove_marker_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        store.append_marker(&key(12), "x").unwrap();

        assert_eq!(store.remove_marker(&key(12)).unwrap(), FileOp::Applied);
        assert_eq!(store.remove_marker(&key(12)).unwrap(), FileOp::AlreadyAbsent);
    }

    #[test]
    fn test_rename_and_remove_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("to_run"));
        let from = dir.path().join("DSJC500.1_3_42.csv");
        let to = dir.path().join("DSJC500.1_3.csv");
        fs::write(&from, "data").unwrap();

        assert_eq!(store.rename_artifact(&from, &to).unwrap(), FileOp::Applied);
        assert!(!from.exists());
        assert_eq!(store.read_artifact(&to).unwrap(), "data");
        assert_eq!(store.rename_artifact(&from, &to).unwrap(), FileOp::AlreadyAbsent);

        assert_eq!(store.remove_artifact(&to).unwrap(), FileOp::Applied);
        assert_eq!(store.remove_artifact(&to).unwrap(), FileOp::AlreadyAbsent);
    }

    #[test]
    fn test_read_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(matches!(
            store.read_artifact(&dir.path().join("nope.csv")),
            Err(StoreError::ArtifactNotFound(_))
        ));
    }
}
