//! Account command handlers: whoami, check, about.

use anyhow::{Result, anyhow};
use bird_reddit_core::SessionClient;
use serde_json::json;

use super::OutputMode;
use crate::ProcessExit;
use crate::output::{format_account, render_account};

const NO_USER_DATA: &str = "No user data returned - cookie may be invalid";

pub(super) async fn run_whoami_command(
    client: &mut SessionClient,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let account = client.me().await?;
    let mut view = format_account(&account, false);
    if view.name.is_empty() {
        view.name = "unknown".to_string();
    }

    if mode.json {
        mode.print_json(&view)?;
    } else {
        print!("{}", render_account(&view, mode.palette));
    }
    Ok(ProcessExit::Success)
}

/// Verifies the credential; every failure is reported, never propagated.
pub(super) async fn run_check_command(
    client: &mut SessionClient,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let outcome = match client.me().await {
        Ok(account) if !account.name.is_empty() => Ok(account.name),
        Ok(_) => Err(anyhow!(NO_USER_DATA)),
        Err(error) => Err(error.into()),
    };

    match outcome {
        Ok(name) => {
            if mode.json {
                mode.print_json(&json!({"status": "ok", "user": name}))?;
            } else {
                mode.print_success(&format!("Authenticated as u/{name}"));
            }
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            if mode.json {
                mode.print_json(&json!({"status": "error", "error": error.to_string()}))?;
            } else {
                mode.print_error(&format!("Auth failed: {error}"));
            }
            Ok(ProcessExit::Failure)
        }
    }
}

pub(super) async fn run_about_command(
    client: &mut SessionClient,
    username: &str,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let account = client.user_about(username).await?;
    let mut view = format_account(&account, true);

    if mode.json {
        mode.print_json(&view)?;
    } else {
        if view.name.is_empty() {
            view.name = username.to_string();
        }
        print!("{}", render_account(&view, mode.palette));
    }
    Ok(ProcessExit::Success)
}
