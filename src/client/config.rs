//! Session client configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::constants::{BASE_URL, CONNECT_TIMEOUT_SECS, HOMEPAGE_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::ClientError;
use super::wait::JitterPolicy;

/// Tunables for a [`SessionClient`](super::SessionClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site root every path is resolved against.
    pub base_url: Url,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Per-request timeout for API calls.
    pub request_timeout: Duration,
    /// Timeout for the homepage cookie visit.
    pub homepage_timeout: Duration,
    /// Delay bands for the suspension points.
    pub jitter: JitterPolicy,
    /// Skip the pre-POST "compose" delay.
    pub no_jitter: bool,
    /// Directory for the identity and jar files; `None` uses the user config dir.
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).expect("static base URL is valid"),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            homepage_timeout: Duration::from_secs(HOMEPAGE_TIMEOUT_SECS),
            jitter: JitterPolicy::default(),
            no_jitter: false,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Points the client at a different site root (tests, mirrors).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|_| ClientError::invalid_url(base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ClientError::invalid_url(base_url));
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Disables or enables the pre-POST delay.
    #[must_use]
    pub fn with_no_jitter(mut self, no_jitter: bool) -> Self {
        self.no_jitter = no_jitter;
        self
    }

    /// Keeps the identity and jar files under `dir`.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Replaces the delay bands.
    #[must_use]
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replaces the request timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Serialized origin, e.g. `https://www.reddit.com`.
    #[must_use]
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// Absolute URL for a site path such as `/r/rust/`.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.origin(), path)
    }

    /// Resolves an API path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::invalid_url(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_reddit() {
        let config = ClientConfig::default();
        assert_eq!(config.origin(), "https://www.reddit.com");
        assert!(!config.no_jitter);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_base_url_rejects_non_http() {
        assert!(ClientConfig::default().with_base_url("ftp://x.test").is_err());
        assert!(ClientConfig::default().with_base_url("not a url").is_err());
    }

    #[test]
    fn test_page_url_and_endpoint_follow_base() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:8080")
            .unwrap();
        assert_eq!(config.page_url("/r/rust/"), "http://127.0.0.1:8080/r/rust/");
        assert_eq!(
            config.endpoint("/api/me.json").unwrap().as_str(),
            "http://127.0.0.1:8080/api/me.json"
        );
    }
}
