use url::Url;

use crate::api::{RemoteAgent, Status};
use crate::error::Result;
use crate::host::{ensure_logged_in, resolve_endpoint, CliHost};
use crate::output::OutputSink;

/// `fast-push-status <app>`: resolve the endpoint and report its health.
/// No diffing.
pub async fn run_fast_push_status<A, F>(
    host: &dyn CliHost,
    app_name: &str,
    connect: F,
    out: &dyn OutputSink,
) -> Result<Status>
where
    A: RemoteAgent,
    F: FnOnce(Url) -> Result<A>,
{
    ensure_logged_in(host).await?;

    let endpoint = resolve_endpoint(host, app_name, out).await?;
    let agent = connect(endpoint)?;

    let status = agent.fetch_status().await?;
    out.say(&format!("App health: {}", status.health));
    Ok(status)
}
