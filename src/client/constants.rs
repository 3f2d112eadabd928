//! Constants for the session client (endpoints, timeouts, rate limiting, jitter).

use std::time::Duration;

/// Upstream site root.
pub const BASE_URL: &str = "https://www.reddit.com";

/// Chrome on macOS, matching the client hints in [`super::headers`].
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Identity endpoint used to bootstrap the modhash.
pub const IDENTITY_PATH: &str = "/api/me.json";

/// Popular listing browsed after bootstrap to deepen the cookie trail.
pub const BROWSE_WARM_UP_PATH: &str = "/r/popular/hot.json";

/// Default HTTP connect timeout.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-request timeout.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Timeout for the homepage cookie visit.
pub const HOMEPAGE_TIMEOUT_SECS: u64 = 15;

/// Requests pause once remaining quota drops below this.
pub const RATE_LIMIT_LOW_WATER: f64 = 5.0;

/// Upper bound on a rate-limit pause.
pub const MAX_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(120);

/// Pause used when the reset time is unknown.
pub const FALLBACK_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(30);

/// Delay band before the bootstrap identity call.
pub const PRE_BOOTSTRAP_JITTER_MS: (u64, u64) = (500, 1_500);

/// Delay band before the popular-listing warm-up.
pub const PRE_BROWSE_JITTER_MS: (u64, u64) = (800, 2_000);

/// Delay band before every POST ("compose and submit" time).
pub const PRE_POST_JITTER_MS: (u64, u64) = (2_000, 5_000);
