//! Local fingerprint cache.
//!
//! Optional. Remembers the checksum of each file together with its size and
//! mtime so an unchanged file does not have to be re-hashed on the next push.
//! Only the local side is cached; the remote state is always fetched fresh.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Namespace UUID for per-project cache file names
const FAST_PUSH_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3f, 0x1c, 0x52, 0x8e, 0x07, 0xb4, 0x4a, 0x6d, 0x9c, 0x21, 0x5e, 0x80, 0xd3, 0x7a, 0x11, 0xf4,
]);

/// Compute a UUID v5 from the project root for the cache file name.
/// Same path always produces the same UUID.
pub fn compute_path_uuid(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    Uuid::new_v5(&FAST_PUSH_NAMESPACE, normalized.as_bytes()).to_string()
}

/// Default cache file for a project: ~/.fast-push/fingerprints/<uuid>.json
pub fn default_cache_path(project_root: &Path) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".fast-push")
        .join("fingerprints")
        .join(format!("{}.json", compute_path_uuid(project_root))))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFingerprint {
    pub size: u64,
    /// File modification time (milliseconds since epoch)
    pub mtime: u64,
    pub checksum: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintCache {
    pub entries: HashMap<String, CachedFingerprint>,
}

impl FingerprintCache {
    /// Load cache from file. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fingerprint cache from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fingerprint cache from {}", path.display()))
    }

    /// Save cache to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize fingerprint cache")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write fingerprint cache to {}", path.display()))
    }

    /// Cached checksum for `path`, if size and mtime still match.
    pub fn lookup(&self, path: &str, size: u64, mtime: u64) -> Option<&str> {
        self.entries
            .get(path)
            .filter(|e| e.size == size && e.mtime == mtime)
            .map(|e| e.checksum.as_str())
    }

    pub fn update(&mut self, path: String, size: u64, mtime: u64, checksum: String) {
        self.entries.insert(
            path,
            CachedFingerprint {
                size,
                mtime,
                checksum,
            },
        );
    }

    /// Drop entries for paths not in `seen`.
    pub fn retain_paths<F>(&mut self, mut seen: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|path, _| seen(path.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
