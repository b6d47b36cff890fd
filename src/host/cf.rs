//! `cf` CLI backed host.
//!
//! Runs read-only `cf` subcommands and parses their text output.

use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::{CliHost, Route};
use crate::error::{FastPushError, Result};

pub struct CfCli {
    bin: String,
}

impl CfCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.bin, args.join(" "))
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Running host command: {}", self.describe(args));
        Command::new(&self.bin)
            .args(args)
            .env("CF_COLOR", "false")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FastPushError::Host {
                command: self.describe(args),
                reason: e.to_string(),
            })
    }
}

/// Routes listed in `cf app` output.
///
/// Current CLIs print `routes:`, older ones `urls:`; both are a comma
/// separated list. An empty list is not an error here.
pub fn parse_app_routes(output: &str) -> Vec<Route> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| {
            line.strip_prefix("routes:")
                .or_else(|| line.strip_prefix("urls:"))
        })
        .map(|list| list.split(',').filter_map(Route::parse).collect())
        .unwrap_or_default()
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[async_trait]
impl CliHost for CfCli {
    async fn is_logged_in(&self) -> Result<bool> {
        let output = self.run(&["oauth-token"]).await?;
        Ok(output.status.success())
    }

    async fn app_routes(&self, app_name: &str) -> Result<Vec<Route>> {
        let args = ["app", app_name];
        let output = self.run(&args).await?;
        let text = combined_output(&output);

        if !output.status.success() {
            if text.to_lowercase().contains("not found") {
                return Err(FastPushError::Configuration(format!(
                    "app {} not found in the targeted org and space",
                    app_name
                )));
            }
            return Err(FastPushError::Host {
                command: self.describe(&args),
                reason: text.trim().to_string(),
            });
        }

        let routes = parse_app_routes(&text);
        debug!("App {} has {} route(s)", app_name, routes.len());
        Ok(routes)
    }
}
