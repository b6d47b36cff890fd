use clap::{Parser, Subcommand};

use crate::api::DEFAULT_TIMEOUT_SECS;

/// cf-fast-push - push incremental changes to a running app without a full redeploy
#[derive(Parser, Debug)]
#[command(name = "cf-fast-push")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory to push (defaults to the current directory)
    #[arg(short = 'p', long, env = "FAST_PUSH_PATH", global = true)]
    pub path: Option<String>,

    /// Timeout for each request to the app, in seconds
    #[arg(
        long,
        env = "FAST_PUSH_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,

    /// cf CLI executable
    #[arg(long, env = "CF_BIN", default_value = "cf", global = true)]
    pub cf_bin: String,

    /// Reuse file fingerprints from the previous push when size and mtime are unchanged
    #[arg(
        long,
        env = "FAST_PUSH_FINGERPRINT_CACHE",
        value_parser = clap::builder::FalseyValueParser::new(),
        global = true
    )]
    pub fingerprint_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push new and changed files to a running app
    #[command(name = "fast-push", visible_alias = "fp")]
    FastPush {
        /// Name of the target app
        app_name: String,

        /// Show what would be pushed without uploading anything
        #[arg(short, long)]
        dry: bool,
    },
    /// Show the health reported by a running app's fast-push agent
    #[command(name = "fast-push-status", visible_alias = "fps")]
    FastPushStatus {
        /// Name of the target app
        app_name: String,
    },
}
