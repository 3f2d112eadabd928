//! Request options for listing and search endpoints.

/// Ordering for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchSort {
    Relevance,
    #[default]
    New,
    Hot,
    Top,
    Comments,
}

impl SearchSort {
    /// Query-string value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::New => "new",
            Self::Hot => "hot",
            Self::Top => "top",
            Self::Comments => "comments",
        }
    }
}

/// Time window for search and top listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    All,
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl TimeFilter {
    /// Query-string value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Ordering for subreddit listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubredditSort {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl SubredditSort {
    /// Path segment, as in `/r/{name}/{sort}.json`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
        }
    }
}

/// Default result count for search, listings, and mentions.
pub const DEFAULT_LISTING_COUNT: u32 = 25;

/// Default number of comments fetched with a post.
pub const DEFAULT_COMMENT_COUNT: u32 = 20;

/// Options for [`SessionClient::search`](crate::SessionClient::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict to one subreddit; `None` searches everything.
    pub subreddit: Option<String>,
    pub count: u32,
    pub sort: SearchSort,
    pub time: TimeFilter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            subreddit: None,
            count: DEFAULT_LISTING_COUNT,
            sort: SearchSort::default(),
            time: TimeFilter::default(),
        }
    }
}

/// Options for [`SessionClient::subreddit_posts`](crate::SessionClient::subreddit_posts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub count: u32,
    pub sort: SubredditSort,
    /// Only sent when `sort` is [`SubredditSort::Top`].
    pub time: TimeFilter,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_LISTING_COUNT,
            sort: SubredditSort::default(),
            time: TimeFilter::default(),
        }
    }
}

/// Body of a new submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    /// A link post.
    Link(String),
    /// A text post; the text may be empty.
    Text(String),
}

impl PostContent {
    /// Picks the submission kind: a non-empty URL makes a link post, anything
    /// else a text post.
    #[must_use]
    pub fn from_parts(body: Option<String>, url: Option<String>) -> Self {
        match url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::Link(url),
            None => Self::Text(body.unwrap_or_default()),
        }
    }
}
