//! Tool-change watcher: appends one line per tool transition to a log file.

use crate::error::TaskError;
use crate::input::ToolChangeSignal;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Drains the tool changed-flag into an append-only log file.
#[derive(Debug, Clone)]
pub struct ToolChangeLogger {
    signal: Arc<ToolChangeSignal>,
    path: PathBuf,
}

impl ToolChangeLogger {
    pub fn new(signal: Arc<ToolChangeSignal>, path: impl Into<PathBuf>) -> Self {
        Self {
            signal,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the pending transition, if any, and acknowledges it.
    ///
    /// Returns true when a line was written. The file is created if missing.
    pub fn poll_once(&self) -> Result<bool, TaskError> {
        let Some(change) = self.signal.take_change() else {
            return Ok(false);
        };

        let io_error = |source| TaskError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;
        file.write_all(change.log_line().as_bytes())
            .map_err(io_error)?;
        log::debug!("Logged tool change to {}", self.path.display());
        Ok(true)
    }
}
