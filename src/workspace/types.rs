//! Snapshot and delta types.
//!
//! A snapshot maps a project-relative, forward-slash path to a `FileEntry`.
//! The local snapshot is built fresh on every push; the remote one is
//! fetched fresh on every push and never cached.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// One file at a point in time.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    /// Lowercase hex SHA-256 of the file content.
    pub checksum: String,
    pub size: Option<u64>,
    /// Modification time (milliseconds since epoch)
    pub mtime: Option<u64>,
    /// Only present on entries selected for upload.
    pub content: Option<Vec<u8>>,
}

impl FileEntry {
    /// Metadata-only entry, as reported by the remote agent.
    pub fn metadata(path: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
            size: None,
            mtime: None,
            content: None,
        }
    }
}

/// Entries are the same file state iff their checksums match.
impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for FileEntry {}

/// Path -> entry.
pub type Snapshot = HashMap<String, FileEntry>;

/// Subset of the local snapshot to upload; every entry carries content.
pub type Delta = HashMap<String, FileEntry>;

/// A file that was left out of the push because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Local snapshot plus what the walk had to leave out.
#[derive(Debug)]
pub struct LocalSnapshot {
    pub root: PathBuf,
    pub entries: Snapshot,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Modified,
}

impl ChangeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ChangeKind::New => "NEW",
            ChangeKind::Modified => "MOD",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A local path that differs from the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
}
