//! Quota tracking from upstream rate-limit headers.
//!
//! Reddit reports its per-client budget on every response:
//!
//! - `x-ratelimit-remaining`: requests left in the window (fractional)
//! - `x-ratelimit-used`: requests spent in the window
//! - `x-ratelimit-reset`: seconds until the window resets
//!
//! The limiter keeps only the latest value of each field. There is no
//! smoothing or history.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::trace;

use super::constants::{FALLBACK_RATE_LIMIT_PAUSE, MAX_RATE_LIMIT_PAUSE, RATE_LIMIT_LOW_WATER};

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const USED_HEADER: &str = "x-ratelimit-used";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Most recently observed quota. `None` means never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimitState {
    /// Requests remaining in the window.
    pub remaining: Option<f64>,
    /// Requests used in the window.
    pub used: Option<u64>,
    /// Seconds until the window resets.
    pub reset_secs: Option<u64>,
}

/// Pause/no-pause decisions derived from the latest response headers.
#[derive(Debug, Default)]
pub struct RateLimiter {
    state: RateLimitState,
}

impl RateLimiter {
    /// Creates a limiter with nothing observed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> RateLimitState {
        self.state
    }

    /// Updates each field present and well-formed in `headers`.
    ///
    /// Missing or malformed values keep the previous field value.
    pub fn observe(&mut self, headers: &HeaderMap) {
        if let Some(remaining) = parse_header::<f64>(headers, REMAINING_HEADER)
            && remaining.is_finite()
        {
            self.state.remaining = Some(remaining);
        }
        if let Some(used) = parse_header::<u64>(headers, USED_HEADER) {
            self.state.used = Some(used);
        }
        if let Some(reset) = parse_header::<u64>(headers, RESET_HEADER) {
            self.state.reset_secs = Some(reset);
        }
        trace!(state = ?self.state, "observed rate limit headers");
    }

    /// True only when remaining quota is known and below the low-water mark.
    #[must_use]
    pub fn should_pause(&self) -> bool {
        self.state
            .remaining
            .is_some_and(|remaining| remaining < RATE_LIMIT_LOW_WATER)
    }

    /// How long to pause: one second past the reset (capped), else a flat fallback.
    #[must_use]
    pub fn pause_duration(&self) -> Duration {
        match self.state.reset_secs {
            Some(reset) => Duration::from_secs(reset.saturating_add(1)).min(MAX_RATE_LIMIT_PAUSE),
            None => FALLBACK_RATE_LIMIT_PAUSE,
        }
    }
}

fn parse_header<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_unknown_quota_never_pauses() {
        let limiter = RateLimiter::new();
        assert!(!limiter.should_pause());
        assert_eq!(limiter.state(), RateLimitState::default());
    }

    #[test]
    fn test_observe_parses_all_fields() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[
            ("x-ratelimit-remaining", "598.0"),
            ("x-ratelimit-used", "2"),
            ("x-ratelimit-reset", "412"),
        ]));

        let state = limiter.state();
        assert_eq!(state.remaining, Some(598.0));
        assert_eq!(state.used, Some(2));
        assert_eq!(state.reset_secs, Some(412));
        assert!(!limiter.should_pause());
    }

    #[test]
    fn test_should_pause_below_low_water() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-remaining", "4.9")]));
        assert!(limiter.should_pause());

        limiter.observe(&headers(&[("x-ratelimit-remaining", "5")]));
        assert!(!limiter.should_pause(), "exactly 5 does not pause");

        limiter.observe(&headers(&[("x-ratelimit-remaining", "0")]));
        assert!(limiter.should_pause());
    }

    #[test]
    fn test_malformed_values_keep_previous() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[
            ("x-ratelimit-remaining", "3"),
            ("x-ratelimit-used", "7"),
            ("x-ratelimit-reset", "10"),
        ]));
        limiter.observe(&headers(&[
            ("x-ratelimit-remaining", "lots"),
            ("x-ratelimit-used", "7.5"),
            ("x-ratelimit-reset", ""),
        ]));

        let state = limiter.state();
        assert_eq!(state.remaining, Some(3.0));
        assert_eq!(state.used, Some(7));
        assert_eq!(state.reset_secs, Some(10));
    }

    #[test]
    fn test_missing_headers_keep_previous() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-used", "1")]));
        limiter.observe(&HeaderMap::new());
        assert_eq!(limiter.state().used, Some(1));
        assert_eq!(limiter.state().remaining, None);
    }

    #[test]
    fn test_most_recent_value_wins() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-remaining", "100")]));
        limiter.observe(&headers(&[("x-ratelimit-remaining", "2")]));
        limiter.observe(&headers(&[("x-ratelimit-remaining", "50")]));
        assert_eq!(limiter.state().remaining, Some(50.0));
    }

    #[test]
    fn test_non_finite_remaining_is_ignored() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-remaining", "NaN")]));
        assert_eq!(limiter.state().remaining, None);
        assert!(!limiter.should_pause());
    }

    #[test]
    fn test_pause_duration_fallback_when_reset_unknown() {
        let limiter = RateLimiter::new();
        assert_eq!(limiter.pause_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_pause_duration_is_reset_plus_one() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-reset", "42")]));
        assert_eq!(limiter.pause_duration(), Duration::from_secs(43));
    }

    #[test]
    fn test_pause_duration_capped() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-reset", "600")]));
        assert_eq!(limiter.pause_duration(), Duration::from_secs(120));

        limiter.observe(&headers(&[("x-ratelimit-reset", "119")]));
        assert_eq!(limiter.pause_duration(), Duration::from_secs(120));
    }

    #[test]
    fn test_pause_duration_known_zero_reset() {
        let mut limiter = RateLimiter::new();
        limiter.observe(&headers(&[("x-ratelimit-reset", "0")]));
        assert_eq!(limiter.pause_duration(), Duration::from_secs(1));
    }
}
