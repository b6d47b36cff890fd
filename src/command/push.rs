use std::path::Path;
use tracing::debug;
use url::Url;

use crate::api::RemoteAgent;
use crate::error::Result;
use crate::host::{ensure_logged_in, resolve_endpoint, CliHost};
use crate::output::OutputSink;
use crate::workspace::{self, PushOptions, PushReport};

/// `fast-push <app> [--dry]`
///
/// `connect` builds the agent client once the endpoint is known; nothing
/// touches the network before the login check and route lookup pass.
pub async fn run_fast_push<A, F>(
    host: &dyn CliHost,
    app_name: &str,
    root: &Path,
    options: &PushOptions,
    connect: F,
    out: &dyn OutputSink,
) -> Result<PushReport>
where
    A: RemoteAgent,
    F: FnOnce(Url) -> Result<A>,
{
    ensure_logged_in(host).await?;

    out.say(&format!("Running fast-push for app {}", app_name));
    let endpoint = resolve_endpoint(host, app_name, out).await?;
    debug!(stage = "endpoint-resolved", %endpoint, "push stage");

    let agent = connect(endpoint)?;
    workspace::push(&agent, root, options, out).await
}
