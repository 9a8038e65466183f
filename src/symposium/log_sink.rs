//! Append-only per-task text logs.
//!
//! The sink is log-for-humans: labeled sections separated by blank lines, no
//! machine-structured format.  Single process, single writer; all appends
//! happen on the task runner.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Destination for per-task debate logs.
pub trait LogSink: Send + Sync {
    /// Append `text` to `file_name`, creating the file if absent.
    fn append(&self, file_name: &str, text: &str) -> io::Result<()>;
}

/// [`LogSink`] writing plain UTF-8 files under a root directory.
///
/// Each append opens the file in append mode, writes, flushes, and closes.
pub struct FileLogSink {
    root: PathBuf,
}

impl FileLogSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileLogSink { root: root.into() }
    }
}

impl Default for FileLogSink {
    /// Sink writing into the current working directory.
    fn default() -> Self {
        FileLogSink::new(".")
    }
}

impl LogSink for FileLogSink {
    fn append(&self, file_name: &str, text: &str) -> io::Result<()> {
        let path = self.root.join(file_name);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn append_creates_and_extends_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileLogSink::new(dir.path());

        sink.append("log_t.log", "first\n\n").unwrap();
        sink.append("log_t.log", "second\n\n").unwrap();

        let written = fs::read_to_string(dir.path().join("log_t.log")).unwrap();
        assert_eq!(written, "first\n\nsecond\n\n");
    }
}
