//! Queue file access.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ControllerError;

/// Return line `line_number` (1-based) of the queue file.
///
/// `None` means the file has fewer lines, or the line is blank: there is
/// nothing to run. The file is streamed, not loaded whole.
pub async fn read_queue_line(
    queue_path: &Path,
    line_number: usize,
) -> Result<Option<String>, ControllerError> {
    let io_err = |source| ControllerError::QueueRead {
        path: queue_path.to_path_buf(),
        source,
    };

    let file = File::open(queue_path).await.map_err(io_err)?;
    let mut lines = BufReader::new(file).lines();
    let mut current = 0usize;

    while let Some(line) = lines.next_line().await.map_err(io_err)? {
        current += 1;
        if current == line_number {
            if line.trim().is_empty() {
                return Ok(None);
            }
            return Ok(Some(line));
        }
    }
    Ok(None)
}
