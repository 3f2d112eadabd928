//! Reddit domain operations and their payload types.

mod model;
mod operations;
mod options;

pub use model::{
    Account, Comment, Listing, ListingData, MaybeWrapped, MutationBody, MutationData,
    MutationEnvelope, Post, PostWithComments, Thing, ThingKind,
};
pub use operations::reply_target;
pub use options::{
    DEFAULT_COMMENT_COUNT, DEFAULT_LISTING_COUNT, ListingOptions, PostContent, SearchOptions,
    SearchSort, SubredditSort, TimeFilter,
};
