//! Wire types for the fast-push agent API.
//!
//! All endpoints live under `https://<app-host>/_fastpush`:
//! - `GET /files` returns `{ "<path>": { "checksum": "<hex>", ... } }`
//! - `PUT /files` takes `{ "<path>": { "checksum": "<hex>", "content": "<base64>" } }`
//! - `GET /status` and `PUT /files` return `{ "health": "<string>" }`

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{FastPushError, Result};
use crate::workspace::{is_valid_checksum, Delta, FileEntry, Snapshot};

/// One file as listed by `GET /files`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFileRecord {
    pub checksum: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified: Option<u64>,
}

/// One file in the `PUT /files` body
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub checksum: String,
    /// Base64 of the raw file bytes
    pub content: String,
}

/// Health summary reported by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub health: String,
}

/// A remote path must be relative, use forward slashes and stay inside the
/// project.
fn is_valid_remote_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Decode and validate a `GET /files` body into a metadata-only snapshot.
pub fn decode_remote_listing(url: &str, body: &str) -> Result<Snapshot> {
    let records: HashMap<String, RemoteFileRecord> = serde_json::from_str(body)
        .map_err(|e| FastPushError::protocol(url, format!("invalid file listing: {}", e)))?;

    let mut snapshot = Snapshot::with_capacity(records.len());
    for (path, record) in records {
        if !is_valid_remote_path(&path) {
            return Err(FastPushError::protocol(
                url,
                format!("invalid path in file listing: {:?}", path),
            ));
        }
        if !is_valid_checksum(&record.checksum) {
            return Err(FastPushError::protocol(
                url,
                format!("invalid checksum for {}: {:?}", path, record.checksum),
            ));
        }
        let mut entry = FileEntry::metadata(path.clone(), record.checksum.to_ascii_lowercase());
        entry.size = record.size;
        entry.mtime = record.modified;
        snapshot.insert(path, entry);
    }
    Ok(snapshot)
}

/// Encode a delta as the `PUT /files` body, ordered by path.
///
/// Entries without content are left out; the diff always attaches content
/// to what it selects.
pub fn encode_delta(delta: &Delta) -> BTreeMap<String, UploadRecord> {
    delta
        .iter()
        .filter_map(|(path, entry)| {
            let content = entry.content.as_ref()?;
            Some((
                path.clone(),
                UploadRecord {
                    checksum: entry.checksum.clone(),
                    content: STANDARD.encode(content),
                },
            ))
        })
        .collect()
}

/// Decode a `{ "health": ... }` body.
pub fn decode_status(url: &str, body: &str) -> Result<Status> {
    serde_json::from_str(body)
        .map_err(|e| FastPushError::protocol(url, format!("invalid status: {}", e)))
}
