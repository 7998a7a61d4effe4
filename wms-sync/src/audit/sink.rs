//! Audit sinks
//!
//! The audit trail is written through [`AuditSink`] so the engine never
//! touches a global file path. Production uses [`FileAuditSink`], tests use
//! [`MemoryAuditSink`] and inspect the captured entries.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::types::LogEntry;

/// Destination for audit entries
pub trait AuditSink: Send + Sync {
    /// Append one entry
    fn append(&self, entry: &LogEntry) -> io::Result<()>;

    /// Last `n` raw lines, oldest first
    fn tail(&self, n: usize) -> io::Result<Vec<String>>;
}

/// Append-only audit file
///
/// The file (and its parent directory) is created on open, so it exists
/// before the first reconciliation pass starts.
pub struct FileAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl std::fmt::Debug for FileAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAuditSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileAuditSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditSink {
    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        let mut line = entry.to_line();
        line.push('\n');
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    fn tail(&self, n: usize) -> io::Result<Vec<String>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut lines = VecDeque::with_capacity(n);
        for line in reader.lines() {
            let line = line?;
            if lines.len() == n {
                lines.pop_front();
            }
            if n > 0 {
                lines.push_back(line);
            }
        }
        Ok(lines.into_iter().collect())
    }
}

/// In-memory sink capturing entries (tests, dry runs)
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn tail(&self, n: usize) -> io::Result<Vec<String>> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        Ok(entries.iter().skip(skip).map(LogEntry::to_line).collect())
    }
}
