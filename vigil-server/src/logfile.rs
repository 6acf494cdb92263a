//! Durable append-only log file

use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use vigil_common::LogEntry;

/// Serialized writer for the durable log.
///
/// Each append is a scoped acquisition: open, write one line, release. Appends
/// are serialized by the mutex so concurrent requests never interleave partial
/// lines. The file is never rotated or truncated.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one `"<timestamp>: <message>"` line
    pub fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.message
        )
    }
}
