//! CLI command handlers.

mod account;
mod browse;
mod write;

use anyhow::Result;
use bird_reddit_core::{ListingOptions, PostContent, SearchOptions, SessionClient};
use serde::Serialize;

use crate::ProcessExit;
use crate::cli::Command;
use crate::output::{Palette, to_pretty_json};

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputMode {
    pub json: bool,
    pub palette: Palette,
}

impl OutputMode {
    pub(crate) fn print_json<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        println!("{}", to_pretty_json(value)?);
        Ok(())
    }

    pub(crate) fn print_success(self, message: &str) {
        println!("{}", self.palette.green(message));
    }

    pub(crate) fn print_error(self, message: &str) {
        eprintln!("{}", self.palette.red(message));
    }
}

/// Runs one subcommand against an initialized-on-demand client.
pub(crate) async fn dispatch(
    command: Command,
    client: &mut SessionClient,
    mode: OutputMode,
) -> Result<ProcessExit> {
    match command {
        Command::Search {
            query,
            subreddit,
            count,
            sort,
            time,
        } => {
            let options = SearchOptions {
                subreddit,
                count,
                sort: sort.into(),
                time: time.into(),
            };
            browse::run_search_command(client, &query, &options, mode).await
        }
        Command::Read {
            post_id,
            comment_count,
        } => browse::run_read_command(client, &post_id, comment_count, mode).await,
        Command::Subreddit {
            name,
            count,
            sort,
            time,
        } => {
            let options = ListingOptions {
                count,
                sort: sort.into(),
                time: time.into(),
            };
            browse::run_subreddit_command(client, &name, &options, mode).await
        }
        Command::Mentions { count } => browse::run_mentions_command(client, count, mode).await,
        Command::Reply { thing_id, text } => {
            write::run_reply_command(client, &thing_id, &text, mode).await
        }
        Command::Post {
            subreddit,
            title,
            body,
            url,
        } => {
            let content = PostContent::from_parts(Some(body), url);
            write::run_post_command(client, &subreddit, &title, &content, mode).await
        }
        Command::Whoami => account::run_whoami_command(client, mode).await,
        Command::Check => account::run_check_command(client, mode).await,
        Command::About { username } => {
            account::run_about_command(client, &username, mode).await
        }
    }
}
