use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod cli;
mod command;
mod config;
mod error;
mod host;
mod output;
mod workspace;

use api::HttpRemoteAgent;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use host::CfCli;
use output::{OutputSink, TerminalSink};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let out = TerminalSink;

    match run(cli, &out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            out.fail(&err.to_string());
            out.say(err.user_hint());
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli, out: &dyn OutputSink) -> Result<()> {
    let config = Config::from_cli(&cli)?;
    let host = CfCli::new(config.cf_bin.clone());
    let timeout = config.timeout;
    let connect = |endpoint| HttpRemoteAgent::new(endpoint, timeout);

    match cli.command {
        Commands::FastPush { app_name, dry } => {
            let options = config.push_options(dry);
            command::run_fast_push(
                &host,
                &app_name,
                &config.project_root,
                &options,
                connect,
                out,
            )
            .await?;
        }
        Commands::FastPushStatus { app_name } => {
            command::run_fast_push_status(&host, &app_name, connect, out).await?;
        }
    }

    Ok(())
}
