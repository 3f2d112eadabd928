//! Read-only command handlers: search, read, subreddit, mentions.

use anyhow::Result;
use bird_reddit_core::{ListingOptions, SearchOptions, SessionClient};
use serde::Serialize;

use super::OutputMode;
use crate::ProcessExit;
use crate::output::{
    CommentView, SubmissionView, format_comment, format_submission, render_comment,
    render_submission, rule,
};

/// A post plus its comments, flattened for `--json`.
#[derive(Debug, Serialize)]
struct ThreadView {
    #[serde(flatten)]
    post: Option<SubmissionView>,
    comments: Vec<CommentView>,
}

fn print_submissions(views: &[SubmissionView], mode: OutputMode) {
    for view in views {
        println!("{}", render_submission(view, mode.palette));
    }
}

pub(super) async fn run_search_command(
    client: &mut SessionClient,
    query: &str,
    options: &SearchOptions,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let listing = client.search(query, options).await?;
    let views: Vec<_> = listing.into_records().iter().map(format_submission).collect();

    if mode.json {
        mode.print_json(&views)?;
    } else {
        println!("Found {} results for '{query}'", views.len());
        println!("{}", rule());
        print_submissions(&views, mode);
    }
    Ok(ProcessExit::Success)
}

pub(super) async fn run_read_command(
    client: &mut SessionClient,
    post_id: &str,
    comment_count: u32,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let thread = client.read_post(post_id, comment_count).await?;
    let post = thread.post.as_ref().map(format_submission);
    let comments: Vec<_> = thread.comments.iter().map(format_comment).collect();

    if mode.json {
        mode.print_json(&ThreadView { post, comments })?;
        return Ok(ProcessExit::Success);
    }

    if let Some(post) = &post {
        println!("{}", render_submission(post, mode.palette));
    }
    if !comments.is_empty() {
        println!("\u{2500}\u{2500}\u{2500} Comments ({}) \u{2500}\u{2500}\u{2500}", comments.len());
        println!();
        for comment in &comments {
            println!("{}", render_comment(comment, mode.palette));
        }
    }
    Ok(ProcessExit::Success)
}

pub(super) async fn run_subreddit_command(
    client: &mut SessionClient,
    name: &str,
    options: &ListingOptions,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let listing = client.subreddit_posts(name, options).await?;
    let views: Vec<_> = listing.into_records().iter().map(format_submission).collect();

    if mode.json {
        mode.print_json(&views)?;
    } else {
        println!("r/{name} - {} ({} posts)", options.sort.as_str(), views.len());
        println!("{}", rule());
        print_submissions(&views, mode);
    }
    Ok(ProcessExit::Success)
}

pub(super) async fn run_mentions_command(
    client: &mut SessionClient,
    count: u32,
    mode: OutputMode,
) -> Result<ProcessExit> {
    let listing = client.mentions(count).await?;
    let views: Vec<_> = listing.into_records().iter().map(format_comment).collect();

    if mode.json {
        mode.print_json(&views)?;
    } else {
        println!("Recent mentions ({})", views.len());
        println!("{}", rule());
        for view in &views {
            println!("{}", render_comment(view, mode.palette));
        }
    }
    Ok(ProcessExit::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bird_reddit_core::Post;

    #[test]
    fn test_thread_view_flattens_post_fields() {
        let post = Post {
            id: "abc".into(),
            ..Post::default()
        };
        let view = ThreadView {
            post: Some(format_submission(&post)),
            comments: Vec::new(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "abc");
        assert!(json["comments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_thread_view_without_post_is_comments_only() {
        let view = ThreadView {
            post: None,
            comments: Vec::new(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({"comments": []}));
    }
}
