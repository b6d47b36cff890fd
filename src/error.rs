//! Error taxonomy for fast-push.
//!
//! Every failure the push or status commands can hit is one of these kinds.
//! The top-level handler in `main` turns them into a message, a hint, and an
//! exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FastPushError>;

#[derive(Debug, Error)]
pub enum FastPushError {
    /// The remote agent could not be reached (connect failure, timeout, TLS).
    #[error("could not reach the fast-push agent at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote agent answered, but not with what the protocol expects.
    #[error("unexpected response from {url}: {reason}")]
    Protocol { url: String, reason: String },

    /// The target application cannot be addressed (not found, no route).
    #[error("{0}")]
    Configuration(String),

    /// A local file or directory could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host CLI reports no logged-in user.
    #[error("not logged in to Cloud Foundry")]
    Authentication,

    /// The host CLI itself could not be run or failed unexpectedly.
    #[error("host CLI command `{command}` failed: {reason}")]
    Host { command: String, reason: String },
}

impl FastPushError {
    pub fn protocol(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Protocol {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Transport { .. } => 3,
            Self::Protocol { .. } => 4,
            Self::Configuration(_) => 5,
            Self::Authentication => 6,
            Self::Host { .. } => 7,
            Self::LocalIo { .. } => 8,
        }
    }

    /// Short guidance shown under the error message.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Self::Transport { .. } => {
                "Check that the app is running and that its fast-push agent is enabled."
            }
            Self::Protocol { .. } => {
                "The app's fast-push agent may be outdated or misconfigured. Redeploy it with `cf push`."
            }
            Self::Configuration(_) => {
                "Map a route to the app first, e.g. `cf map-route APP DOMAIN --hostname HOST`."
            }
            Self::Authentication => "Run `cf login` and try again.",
            Self::Host { .. } => "Make sure the cf CLI is installed and on PATH, or pass --cf-bin.",
            Self::LocalIo { .. } => "Check the project path and its permissions.",
        }
    }
}
