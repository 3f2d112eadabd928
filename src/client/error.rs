//! Error types for the session client.
//!
//! Bootstrap failures never appear here; they are absorbed into the
//! [`BootstrapReport`](super::BootstrapReport). What remains are genuine
//! upstream failures surfaced to the caller.

use thiserror::Error;

/// Guidance attached to [`ClientError::Blocked`].
pub const BLOCKED_SUGGESTION: &str = "Your account may need verification \
    (check reddit.com in browser for CAPTCHA/email prompts), \
    or the reddit_session cookie may be expired.";

/// Errors that can occur while issuing API requests.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response. Not retried.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response body, for reporting.
        body: String,
    },

    /// A mutating request was rejected with 403.
    ///
    /// Usually a stale credential or account friction rather than a transient
    /// failure, so it is kept apart from [`ClientError::HttpStatus`].
    #[error("[BLOCKED] 403 Forbidden: Reddit blocked this action ({url})\n  Suggestion: {suggestion}")]
    Blocked {
        /// The URL that was rejected.
        url: String,
        /// User-facing remediation text.
        suggestion: &'static str,
    },

    /// Response body was not the expected JSON shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A request URL could not be built.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL or path.
        url: String,
    },

    /// A header value contained characters HTTP does not allow.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// The header name.
        name: &'static str,
    },

    /// The session credential holds bytes a `Cookie` header cannot carry.
    #[error("REDDIT_SESSION contains characters that cannot be sent in a cookie header")]
    InvalidCredential,

    /// The HTTP transport could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ClientError {
    /// Classifies a transport error as timeout or network failure.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a blocked-action error.
    pub fn blocked(url: impl Into<String>) -> Self {
        Self::Blocked {
            url: url.into(),
            suggestion: BLOCKED_SUGGESTION,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Whether this is the distinguished blocked-action failure.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Blocked { .. } => Some(403),
            _ => None,
        }
    }
}

// No `From<reqwest::Error>`: every variant needs the URL for context.
