//! CLI output formatting and display helpers.
//!
//! `format_*` flatten upstream records into the JSON-mode shapes; `render_*`
//! turn those shapes into terminal text. Renderers return strings so the
//! command handlers decide where they go.

use std::fmt::Write as _;

use bird_reddit_core::{Account, Comment, Post};
use chrono::DateTime;
use colored::{ColoredString, Colorize};
use serde::Serialize;

const DELETED_AUTHOR: &str = "[deleted]";
const PERMALINK_HOST: &str = "https://reddit.com";
const POST_BODY_LIMIT: usize = 500;
const COMMENT_BODY_LIMIT: usize = 400;

/// Horizontal rule under list headings.
pub const RULE_WIDTH: usize = 60;

/// Terminal styling via `colored`, or plain text when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.enabled {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    pub fn cyan(self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn blue(self, text: &str) -> String {
        self.paint(text, |t| t.blue())
    }

    pub fn green(self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn red(self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }
}

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

/// JSON-mode shape of a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionView {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub created: String,
    pub url: String,
    pub selftext: String,
    /// `None` for self posts.
    pub link_url: Option<String>,
    pub flair: Option<String>,
}

/// JSON-mode shape of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub score: i64,
    pub created: String,
    pub body: String,
    pub parent_id: String,
    pub is_submitter: bool,
}

/// JSON-mode shape of an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub name: String,
    pub id: String,
    pub comment_karma: i64,
    pub link_karma: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mod: Option<bool>,
    pub created: Option<f64>,
}

/// Formats a UTC epoch timestamp; missing or zero becomes `?`.
pub fn format_timestamp(created_utc: Option<f64>) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let seconds = match created_utc {
        Some(value) if value.is_finite() && value != 0.0 => value.trunc() as i64,
        _ => return "?".to_string(),
    };
    DateTime::from_timestamp(seconds, 0).map_or_else(
        || "?".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

fn author_or_deleted(author: Option<&str>) -> String {
    author.unwrap_or(DELETED_AUTHOR).to_string()
}

/// Public URL for a site-relative permalink.
pub fn permalink_url(permalink: &str) -> String {
    format!("{PERMALINK_HOST}{permalink}")
}

pub fn format_submission(post: &Post) -> SubmissionView {
    SubmissionView {
        id: post.id.clone(),
        subreddit: post.subreddit.clone(),
        title: post.title.clone(),
        author: author_or_deleted(post.author.as_deref()),
        score: post.score,
        upvote_ratio: post.upvote_ratio,
        num_comments: post.num_comments,
        created: format_timestamp(post.created_utc),
        url: permalink_url(&post.permalink),
        selftext: post.selftext.clone(),
        link_url: if post.is_self { None } else { post.url.clone() },
        flair: post.link_flair_text.clone(),
    }
}

pub fn format_comment(comment: &Comment) -> CommentView {
    CommentView {
        id: comment.id.clone(),
        author: author_or_deleted(comment.author.as_deref()),
        score: comment.score,
        created: format_timestamp(comment.created_utc),
        body: comment.body.clone(),
        parent_id: comment.parent_id.clone(),
        is_submitter: comment.is_submitter,
    }
}

/// `is_mod` is only reported for profile lookups.
pub fn format_account(account: &Account, include_mod: bool) -> AccountView {
    AccountView {
        name: account.name.clone(),
        id: account.id.clone(),
        comment_karma: account.comment_karma,
        link_karma: account.link_karma,
        is_mod: include_mod.then_some(account.is_mod),
        created: account.created_utc,
    }
}

/// Keeps the first `limit` characters, appending `...` when cut.
pub fn truncate_body(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut output: String = text.chars().take(limit).collect();
    output.push_str("...");
    output
}

pub fn render_submission(view: &SubmissionView, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.bold(&view.title));
    let _ = writeln!(
        out,
        "  r/{} | {} | {} pts | {} comments | {}",
        view.subreddit, view.author, view.score, view.num_comments, view.created
    );
    if !view.selftext.is_empty() {
        let _ = writeln!(out, "  {}", truncate_body(&view.selftext, POST_BODY_LIMIT));
    }
    if let Some(link) = view.link_url.as_deref().filter(|link| !link.is_empty()) {
        let _ = writeln!(out, "  {}", palette.cyan(link));
    }
    let _ = writeln!(out, "  {}", palette.blue(&view.url));
    let _ = writeln!(out, "  id: {}", view.id);
    out
}

pub fn render_comment(view: &CommentView, palette: Palette) -> String {
    let mut out = String::new();
    let op_tag = if view.is_submitter { " [OP]" } else { "" };
    let _ = writeln!(
        out,
        "  {} | {} pts | {}",
        palette.bold(&format!("{}{op_tag}", view.author)),
        view.score,
        view.created
    );
    for line in truncate_body(&view.body, COMMENT_BODY_LIMIT).split('\n') {
        let _ = writeln!(out, "    {line}");
    }
    let _ = writeln!(out, "    id: {}", view.id);
    out
}

pub fn render_account(view: &AccountView, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.bold(&view.name));
    let _ = writeln!(out, "  comment karma: {}", view.comment_karma);
    let _ = writeln!(out, "  link karma: {}", view.link_karma);
    if let Some(is_mod) = view.is_mod {
        let _ = writeln!(out, "  moderator: {is_mod}");
    }
    out
}

pub fn rule() -> String {
    "\u{2500}".repeat(RULE_WIDTH)
}

/// Pretty JSON, the way every `--json` command prints.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
