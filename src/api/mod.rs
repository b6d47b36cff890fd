//! Client side of the fast-push agent API.
//!
//! The agent runs inside the deployed app and exposes its file state and
//! health over JSON. `RemoteAgent` is the seam the push logic talks to;
//! `HttpRemoteAgent` is the real implementation.

mod client;
mod http;
#[cfg(test)]
pub mod mock;
mod types;

pub use client::{HttpRemoteAgent, DEFAULT_TIMEOUT_SECS};
pub use types::Status;

use async_trait::async_trait;

use crate::error::Result;
use crate::workspace::{Delta, Snapshot};

/// A fast-push agent bound to one app endpoint.
#[async_trait]
pub trait RemoteAgent: Send + Sync {
    /// Base URL of the agent, for messages.
    fn endpoint(&self) -> &str;

    /// `GET /files`: the remote file state, metadata only.
    async fn fetch_files(&self) -> Result<Snapshot>;

    /// `PUT /files`: upload new and changed files.
    async fn push_delta(&self, delta: &Delta) -> Result<Status>;

    /// `GET /status`
    async fn fetch_status(&self) -> Result<Status>;
}

#[async_trait]
impl<T: RemoteAgent + ?Sized> RemoteAgent for &T {
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    async fn fetch_files(&self) -> Result<Snapshot> {
        (**self).fetch_files().await
    }

    async fn push_delta(&self, delta: &Delta) -> Result<Status> {
        (**self).push_delta(delta).await
    }

    async fn fetch_status(&self) -> Result<Status> {
        (**self).fetch_status().await
    }
}
