use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::send;
use super::types::{decode_remote_listing, decode_status, encode_delta, Status};
use super::RemoteAgent;
use crate::error::{FastPushError, Result};
use crate::workspace::{Delta, Snapshot};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI version (from Cargo.toml)
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_user_agent() -> String {
    format!("cf-fast-push/{}", VERSION)
}

/// HTTP client bound to one app's fast-push endpoint.
pub struct HttpRemoteAgent {
    client: Client,
    /// Endpoint with a trailing slash so relative joins stay under it.
    base: Url,
}

impl HttpRemoteAgent {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(build_user_agent())
            .build()
            .map_err(|source| FastPushError::Transport {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base: with_trailing_slash(endpoint),
        })
    }

    fn build_url(&self, endpoint: &str) -> Result<Url> {
        self.base.join(endpoint).map_err(|e| {
            FastPushError::protocol(
                self.base.as_str(),
                format!("cannot build URL for {}: {}", endpoint, e),
            )
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl RemoteAgent for HttpRemoteAgent {
    fn endpoint(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    async fn fetch_files(&self) -> Result<Snapshot> {
        let url = self.build_url("files")?;
        debug!("GET {}", url);
        let body = send(self.client.get(url.clone()), url.as_str()).await?;
        decode_remote_listing(url.as_str(), &body)
    }

    async fn push_delta(&self, delta: &Delta) -> Result<Status> {
        let url = self.build_url("files")?;
        let payload = encode_delta(delta);
        debug!("PUT {} ({} files)", url, payload.len());
        let body = send(self.client.put(url.clone()).json(&payload), url.as_str()).await?;
        decode_status(url.as_str(), &body)
    }

    async fn fetch_status(&self) -> Result<Status> {
        let url = self.build_url("status")?;
        debug!("GET {}", url);
        let body = send(self.client.get(url.clone()), url.as_str()).await?;
        decode_status(url.as_str(), &body)
    }
}
