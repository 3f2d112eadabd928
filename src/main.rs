//! CLI entry point for bird-reddit.

use std::process::ExitCode;

use anyhow::{Context, Result};
use bird_reddit_core::{ClientConfig, SessionClient, resolve_credentials};
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod output;

use cli::Args;
use commands::OutputMode;
use output::{Palette, is_dumb_terminal, no_color_env_requested};

/// Overrides the site root (mirrors, local test servers).
const BASE_URL_ENV: &str = "BIRD_REDDIT_BASE_URL";

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(value: ProcessExit) -> Self {
        match value {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

fn init_tracing(default_level: &str, no_color: bool) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

fn client_config(no_jitter: bool) -> Result<ClientConfig> {
    let config = ClientConfig::default().with_no_jitter(no_jitter);
    match std::env::var(BASE_URL_ENV) {
        Ok(base_url) if !base_url.trim().is_empty() => config
            .with_base_url(base_url.trim())
            .with_context(|| format!("{BASE_URL_ENV} is not a valid http(s) URL")),
        _ => Ok(config),
    }
}

async fn run(args: Args, mode: OutputMode) -> Result<ProcessExit> {
    let credential = resolve_credentials()?;
    let config = client_config(args.no_jitter)?;
    let mut client = SessionClient::new(credential, config)?;

    let exit = commands::dispatch(args.command, &mut client, mode).await?;
    if let Some(report) = client.bootstrap_report() {
        debug!(clean = report.is_clean(), "bootstrap summary");
    }
    Ok(exit)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let no_color = args.no_color || no_color_env_requested() || is_dumb_terminal();
    if no_color {
        colored::control::set_override(false);
    }
    init_tracing(args.default_log_level(), no_color);
    debug!(?args, "CLI arguments parsed");

    let mode = OutputMode {
        json: args.json,
        palette: Palette::new(!no_color),
    };
    match run(args, mode).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            mode.print_error(&format!("{error:#}"));
            ExitCode::FAILURE
        }
    }
}
