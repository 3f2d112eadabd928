//! Bird Reddit Core Library
//!
//! A Reddit client that talks to the site's JSON API as a returning,
//! logged-in browser session rather than as an automated client.
//!
//! # Architecture
//!
//! - [`auth`] - Session credential, device identity, and the cross-run cookie jar
//! - [`client`] - Session client: lazy bootstrap, headers, jitter, rate limits
//! - [`api`] - Domain operations (search, read, reply, post, profiles) and payload types

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod client;

// Re-export commonly used types
pub use api::{
    Account, Comment, DEFAULT_COMMENT_COUNT, DEFAULT_LISTING_COUNT, Listing, ListingOptions,
    MutationEnvelope, Post, PostContent, PostWithComments, SearchOptions, SearchSort,
    SubredditSort, TimeFilter,
};
pub use auth::{
    CookieJar, CredentialError, DeviceIdentityStore, SessionCredential, resolve_credentials,
};
pub use client::{
    BootstrapReport, BootstrapStep, ClientConfig, ClientError, JitterPolicy, NoWait,
    RateLimitState, SessionClient, StepOutcome, TokioWaiter, Waiter,
};
