//! Runtime configuration assembled from the command line and environment.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::cli::{resolve_project_root, Cli};
use crate::error::Result;
use crate::workspace::{default_cache_path, PushOptions};

#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    pub cf_bin: String,
    /// `None` when the fingerprint cache is disabled or has no home to live in.
    pub fingerprint_cache: Option<PathBuf>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = resolve_project_root(cli.path.as_deref())?;

        let fingerprint_cache = if cli.fingerprint_cache {
            match default_cache_path(&project_root) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Fingerprint cache disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            project_root,
            timeout: Duration::from_secs(cli.timeout),
            cf_bin: cli.cf_bin.clone(),
            fingerprint_cache,
        })
    }

    pub fn push_options(&self, dry_run: bool) -> PushOptions {
        PushOptions {
            dry_run,
            fingerprint_cache: self.fingerprint_cache.clone(),
        }
    }
}
