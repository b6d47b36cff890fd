//! Local snapshot builder.
//!
//! Walks the project root with `ignore::WalkBuilder` and fingerprints every
//! regular file. Walk rules:
//! - hidden and VCS-ignored files are included (standard filters off)
//! - VCS metadata and `.cfignore` itself are always excluded (`DEFAULT_EXCLUDES`)
//! - the `.cfignore` at the project root is honored, with gitignore syntax;
//!   `.cfignore` files in subdirectories have no effect
//! - symlinks are not followed and, like other special files, are skipped
//!
//! File content is not kept here; the diff reads it only for files that
//! have to be uploaded.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

use crate::error::{FastPushError, Result};

use super::cache::FingerprintCache;
use super::fingerprint::fingerprint_file;
use super::types::{FileEntry, LocalSnapshot, SkippedFile, Snapshot};

/// Ignore file honored during the walk (same syntax as .gitignore).
pub const CF_IGNORE_FILENAME: &str = ".cfignore";

/// Never pushed, whatever `.cfignore` says.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "_darcs",
    ".DS_Store",
    CF_IGNORE_FILENAME,
];

/// Load `<root>/.cfignore`, if there is one.
fn load_cf_ignore(root_path: &Path) -> Option<Gitignore> {
    let path = root_path.join(CF_IGNORE_FILENAME);
    if !path.is_file() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root_path);
    if let Some(e) = builder.add(&path) {
        warn!("Problem reading {}: {}", path.display(), e);
    }
    match builder.build() {
        Ok(gitignore) => Some(gitignore),
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}

fn build_walker(root_path: &Path) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root_path);

    builder.standard_filters(false);
    builder.follow_links(false);

    // "!" marks an override glob as an exclusion
    let mut override_builder = OverrideBuilder::new(root_path);
    for pattern in DEFAULT_EXCLUDES {
        if let Err(e) = override_builder.add(&format!("!{}", pattern)) {
            warn!("Failed to add default exclude '{}': {}", pattern, e);
        }
    }
    match override_builder.build() {
        Ok(overrides) => {
            builder.overrides(overrides);
        }
        Err(e) => warn!("Failed to build default excludes: {}", e),
    }

    if let Some(cf_ignore) = load_cf_ignore(root_path) {
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            entry.depth() == 0 || !cf_ignore.matched(entry.path(), is_dir).is_ignore()
        });
    }

    builder
}

/// Convert an absolute path under `root_path` to a forward-slash relative path.
pub fn relative_path(path: &Path, root_path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root_path).ok()?;
    let rel = rel.to_str()?;
    Some(rel.replace('\\', "/"))
}

/// Best-effort path for a walk error, for the skipped-file report.
fn walk_error_path(err: &ignore::Error, root_path: &Path) -> String {
    match err {
        ignore::Error::WithPath { path, .. } => {
            relative_path(path, root_path).unwrap_or_else(|| path.display().to_string())
        }
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err, root_path)
        }
        _ => root_path.display().to_string(),
    }
}

/// Get file modification time in milliseconds since epoch
fn mtime_millis(metadata: &fs::Metadata) -> Option<u64> {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
}

/// Build the local snapshot for `root_path`.
///
/// Only a missing or unreadable root is an error. Any single file that
/// cannot be read is recorded in `skipped` and the walk goes on. When a
/// fingerprint cache is given, files whose size and mtime match a cached
/// entry reuse its checksum, and the cache is refreshed with this walk.
pub fn build_local_snapshot(
    root_path: &Path,
    mut cache: Option<&mut FingerprintCache>,
) -> Result<LocalSnapshot> {
    let root_meta =
        fs::metadata(root_path).map_err(|e| FastPushError::local_io(root_path, e))?;
    if !root_meta.is_dir() {
        return Err(FastPushError::local_io(
            root_path,
            std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        ));
    }

    debug!("Scanning project: {}", root_path.display());

    let mut entries = Snapshot::new();
    let mut skipped = Vec::new();
    let mut cache_hits = 0usize;

    for entry in build_walker(root_path).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking directory: {}", e);
                skipped.push(SkippedFile {
                    path: walk_error_path(&e, root_path),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            debug!("Skipping non-regular file: {}", path.display());
            continue;
        }

        let relative = match relative_path(path, root_path) {
            Some(p) => p,
            None => {
                warn!("Skipping path that is not valid UTF-8: {}", path.display());
                skipped.push(SkippedFile {
                    path: path.to_string_lossy().into_owned(),
                    reason: "path is not valid UTF-8".to_string(),
                });
                continue;
            }
        };

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", path.display(), e);
                skipped.push(SkippedFile {
                    path: relative,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let mtime = mtime_millis(&metadata);

        let cached = match (&cache, mtime) {
            (Some(c), Some(m)) => c.lookup(&relative, metadata.len(), m).map(str::to_owned),
            _ => None,
        };

        let (checksum, size) = match cached {
            Some(checksum) => {
                cache_hits += 1;
                (checksum, metadata.len())
            }
            None => match fingerprint_file(path) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Failed to read file {}: {}", path.display(), e);
                    skipped.push(SkippedFile {
                        path: relative,
                        reason: e.to_string(),
                    });
                    continue;
                }
            },
        };

        if let (Some(c), Some(m)) = (cache.as_deref_mut(), mtime) {
            c.update(relative.clone(), size, m, checksum.clone());
        }

        entries.insert(
            relative.clone(),
            FileEntry {
                path: relative,
                checksum,
                size: Some(size),
                mtime,
                content: None,
            },
        );
    }

    if let Some(c) = cache {
        c.retain_paths(|p| entries.contains_key(p));
    }

    debug!(
        "Found {} files ({} fingerprints from cache, {} skipped)",
        entries.len(),
        cache_hits,
        skipped.len()
    );

    Ok(LocalSnapshot {
        root: root_path.to_path_buf(),
        entries,
        skipped,
    })
}
