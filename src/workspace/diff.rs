//! Local vs. remote reconciliation.
//!
//! A local path is NEW when the remote does not know it and MODIFIED when the
//! checksums differ. Paths that exist only on the remote side are left alone:
//! deletions are not propagated.

use std::fs;
use tracing::{debug, warn};

use super::fingerprint::fingerprint;
use super::types::{Change, ChangeKind, Delta, FileEntry, LocalSnapshot, SkippedFile, Snapshot};

/// Delta ready for upload, plus what was left out of it.
#[derive(Debug, Default)]
pub struct DeltaOutcome {
    pub delta: Delta,
    /// Changes that made it into `delta`, sorted by path.
    pub changes: Vec<Change>,
    pub skipped: Vec<SkippedFile>,
    pub unchanged: usize,
}

impl DeltaOutcome {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

/// Classify every local entry against the remote snapshot.
///
/// Unchanged entries are not returned. The result is sorted by path.
pub fn classify(local: &Snapshot, remote: &Snapshot) -> Vec<Change> {
    let mut changes: Vec<Change> = local
        .iter()
        .filter_map(|(path, entry)| {
            let kind = match remote.get(path) {
                None => ChangeKind::New,
                Some(theirs) if theirs.checksum != entry.checksum => ChangeKind::Modified,
                Some(_) => return None,
            };
            Some(Change {
                path: path.clone(),
                kind,
            })
        })
        .collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

/// Compute the upload delta.
///
/// Content is read from disk here, and only for changed files. The content
/// is fingerprinted again as it is read so the checksum sent always matches
/// the bytes sent. A file that cannot be read is skipped.
pub fn compute_delta(local: &LocalSnapshot, remote: &Snapshot) -> DeltaOutcome {
    let classified = classify(&local.entries, remote);
    let mut outcome = DeltaOutcome {
        unchanged: local.entries.len() - classified.len(),
        ..DeltaOutcome::default()
    };

    for change in classified {
        let Some(entry) = local.entries.get(&change.path) else {
            continue;
        };
        let full_path = local.root.join(&change.path);

        let content = match fs::read(&full_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read file {}: {}", full_path.display(), e);
                outcome.skipped.push(SkippedFile {
                    path: change.path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let checksum = fingerprint(&content);
        if checksum != entry.checksum {
            debug!("{} changed after it was scanned", change.path);
        }

        outcome.delta.insert(
            change.path.clone(),
            FileEntry {
                path: change.path.clone(),
                checksum,
                size: Some(content.len() as u64),
                mtime: entry.mtime,
                content: Some(content),
            },
        );
        outcome.changes.push(change);
    }

    outcome
}
