//! Mutating command handlers: reply and post.
//!
//! Upstream rejections arrive as data inside the envelope; each one is printed
//! and the process exits non-zero.

use anyhow::Result;
use bird_reddit_core::{MutationEnvelope, PostContent, SessionClient};
use serde_json::json;

use super::OutputMode;
use crate::ProcessExit;
use crate::output::permalink_url;

fn report_rejection(envelope: &MutationEnvelope, mode: OutputMode) -> Option<ProcessExit> {
    if !envelope.is_rejected() {
        return None;
    }
    for message in envelope.error_messages() {
        mode.print_error(&format!("Reddit error: {message}"));
    }
    Some(ProcessExit::Failure)
}

pub(super) async fn run_reply_command(
    client: &mut SessionClient,
    thing_id: &str,
    text: &str,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let envelope = client.reply(thing_id, text).await?;
    if let Some(exit) = report_rejection(&envelope, mode) {
        return Ok(exit);
    }

    let created = envelope.created_comment();
    if mode.json {
        let value = match created {
            Some(comment) => json!({
                "status": "ok",
                "comment_id": comment.id,
                "thing_id": thing_id,
                "url": permalink_url(&comment.permalink),
            }),
            None => json!({"status": "ok", "thing_id": thing_id}),
        };
        mode.print_json(&value)?;
    } else {
        match created {
            Some(comment) => mode.print_success(&format!(
                "Reply posted: {}",
                permalink_url(&comment.permalink)
            )),
            None => mode.print_success("Reply posted"),
        }
    }
    Ok(ProcessExit::Success)
}

pub(super) async fn run_post_command(
    client: &mut SessionClient,
    subreddit: &str,
    title: &str,
    content: &PostContent,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let envelope = client.submit_post(subreddit, title, content).await?;
    if let Some(exit) = report_rejection(&envelope, mode) {
        return Ok(exit);
    }

    let data = envelope.data();
    let post_url = data.and_then(|d| d.url.clone()).unwrap_or_default();
    let post_id = data.and_then(|d| d.id.clone()).unwrap_or_default();

    if mode.json {
        mode.print_json(&json!({"status": "ok", "post_id": post_id, "url": post_url}))?;
    } else {
        mode.print_success(&format!("Post created: {post_url}"));
    }
    Ok(ProcessExit::Success)
}
