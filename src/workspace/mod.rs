//! Project file state and reconciliation.
//!
//! This module handles the local side of a fast-push:
//! - Fingerprinting file content
//! - Walking the project into a local snapshot
//! - Diffing the local snapshot against the remote one
//! - Sequencing a whole push against a remote agent

mod cache;
mod diff;
mod fingerprint;
mod scanner;
mod sync;
mod types;

// Re-exports
pub use cache::default_cache_path;
#[cfg(test)]
pub use fingerprint::fingerprint;
pub use fingerprint::is_valid_checksum;
pub use sync::{push, PushOptions, PushReport};
pub use types::{Delta, FileEntry, Snapshot};
