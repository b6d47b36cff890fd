//! The host CLI the command runs under.
//!
//! fast-push does not manage sessions or look up apps itself; it asks the
//! host (the `cf` CLI) whether the user is logged in and which routes an app
//! has, and derives the agent endpoint from the first route.

mod cf;

pub use cf::CfCli;

use async_trait::async_trait;
use url::Url;

use crate::error::{FastPushError, Result};
use crate::output::OutputSink;

/// Path of the agent inside the app.
pub const AGENT_PATH: &str = "_fastpush";

/// A route mapped to an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub host: String,
    pub domain: String,
}

impl Route {
    /// Parse `host.domain[/path]`. The path part is dropped.
    pub fn parse(route: &str) -> Option<Self> {
        let route = route.trim();
        let hostname = route.split('/').next().unwrap_or_default();
        if hostname.is_empty() {
            return None;
        }
        match hostname.split_once('.') {
            Some((host, domain)) if !host.is_empty() && !domain.is_empty() => Some(Self {
                host: host.to_string(),
                domain: domain.to_string(),
            }),
            _ => Some(Self {
                host: String::new(),
                domain: hostname.to_string(),
            }),
        }
    }

    /// Full externally routable host name.
    pub fn hostname(&self) -> String {
        if self.host.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.host, self.domain)
        }
    }
}

/// What fast-push needs from the host CLI.
#[async_trait]
pub trait CliHost: Send + Sync {
    async fn is_logged_in(&self) -> Result<bool>;

    /// Routes mapped to `app_name`. Fails with a configuration error when
    /// the app does not exist.
    async fn app_routes(&self, app_name: &str) -> Result<Vec<Route>>;
}

/// Fail with an authentication error unless the host has a logged-in user.
pub async fn ensure_logged_in(host: &dyn CliHost) -> Result<()> {
    if host.is_logged_in().await? {
        Ok(())
    } else {
        Err(FastPushError::Authentication)
    }
}

/// Agent endpoint for a route: `https://<hostname>/_fastpush`.
pub fn endpoint_for(route: &Route) -> Result<Url> {
    let raw = format!("https://{}/{}", route.hostname(), AGENT_PATH);
    Url::parse(&raw).map_err(|e| {
        FastPushError::Configuration(format!("route {} is not a valid host: {}", route.hostname(), e))
    })
}

/// Resolve the agent endpoint of `app_name` from its first mapped route.
pub async fn resolve_endpoint(
    host: &dyn CliHost,
    app_name: &str,
    out: &dyn OutputSink,
) -> Result<Url> {
    let routes = host.app_routes(app_name).await?;

    let first = routes.first().ok_or_else(|| {
        FastPushError::Configuration(format!("app {} has no route mapped to it", app_name))
    })?;

    if routes.len() > 1 {
        out.warn("multiple routes are mapped to this app, using the first one:");
        for route in &routes {
            out.say(&format!("  {}", route.hostname()));
        }
    }
    out.say(&format!("app host: {}", first.host));
    out.say(&format!("app domain: {}", first.domain));

    endpoint_for(first)
}
