use std::path::PathBuf;

use crate::error::{FastPushError, Result};

/// Resolve the project root: the given path, or the current directory.
pub fn resolve_project_root(path: Option<&str>) -> Result<PathBuf> {
    let root = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().map_err(|e| FastPushError::local_io(".", e))?,
    };
    root.canonicalize()
        .map_err(|e| FastPushError::local_io(&root, e))
}
