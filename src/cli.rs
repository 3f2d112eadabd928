//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};

use bird_reddit_core::{
    DEFAULT_COMMENT_COUNT, DEFAULT_LISTING_COUNT, SearchSort, SubredditSort, TimeFilter,
};

/// Search, read, reply, and post on Reddit from the terminal.
///
/// Requests go out as a logged-in browser session, authenticated with the
/// `reddit_session` cookie from `REDDIT_SESSION` or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "bird-reddit")]
#[command(author, version, about)]
pub struct Args {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable the random delay before writes
    #[arg(long, global = true)]
    pub no_jitter: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for posts
    Search {
        query: String,
        /// Limit to a specific subreddit
        #[arg(short, long)]
        subreddit: Option<String>,
        /// Number of results
        #[arg(short = 'n', long, default_value_t = DEFAULT_LISTING_COUNT)]
        count: u32,
        #[arg(long, value_enum, default_value_t = SearchSortArg::New)]
        sort: SearchSortArg,
        #[arg(long, value_enum, default_value_t = TimeFilterArg::Week)]
        time: TimeFilterArg,
    },

    /// Read a post and its comments
    Read {
        post_id: String,
        /// Number of top comments
        #[arg(short = 'n', long = "comments", default_value_t = DEFAULT_COMMENT_COUNT)]
        comment_count: u32,
    },

    /// Reply to a post (t3_xxx) or comment (t1_xxx)
    Reply { thing_id: String, text: String },

    /// Create a new post in a subreddit
    Post {
        subreddit: String,
        title: String,
        /// Post body text
        #[arg(short, long, default_value = "")]
        body: String,
        /// Link URL (creates a link post)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Browse a subreddit
    Subreddit {
        name: String,
        /// Number of posts
        #[arg(short = 'n', long, default_value_t = DEFAULT_LISTING_COUNT)]
        count: u32,
        #[arg(long, value_enum, default_value_t = SubredditSortArg::Hot)]
        sort: SubredditSortArg,
        #[arg(long, value_enum, default_value_t = TimeFilterArg::Week)]
        time: TimeFilterArg,
    },

    /// Show the authenticated user
    Whoami,

    /// Check authentication status
    Check,

    /// Show info about a Reddit user
    About { username: String },

    /// Show recent mentions of your username
    Mentions {
        /// Number of mentions
        #[arg(short = 'n', long, default_value_t = DEFAULT_LISTING_COUNT)]
        count: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchSortArg {
    Relevance,
    New,
    Hot,
    Top,
    Comments,
}

impl From<SearchSortArg> for SearchSort {
    fn from(value: SearchSortArg) -> Self {
        match value {
            SearchSortArg::Relevance => Self::Relevance,
            SearchSortArg::New => Self::New,
            SearchSortArg::Hot => Self::Hot,
            SearchSortArg::Top => Self::Top,
            SearchSortArg::Comments => Self::Comments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubredditSortArg {
    Hot,
    New,
    Top,
    Rising,
}

impl From<SubredditSortArg> for SubredditSort {
    fn from(value: SubredditSortArg) -> Self {
        match value {
            SubredditSortArg::Hot => Self::Hot,
            SubredditSortArg::New => Self::New,
            SubredditSortArg::Top => Self::Top,
            SubredditSortArg::Rising => Self::Rising,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeFilterArg {
    All,
    Day,
    Week,
    Month,
    Year,
}

impl From<TimeFilterArg> for TimeFilter {
    fn from(value: TimeFilterArg) -> Self {
        match value {
            TimeFilterArg::All => Self::All,
            TimeFilterArg::Day => Self::Day,
            TimeFilterArg::Week => Self::Week,
            TimeFilterArg::Month => Self::Month,
            TimeFilterArg::Year => Self::Year,
        }
    }
}

impl Args {
    /// Default tracing filter: `-q` wins over `-v`.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
