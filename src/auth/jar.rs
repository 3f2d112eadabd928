//! Cross-run browser cookie jar.
//!
//! The jar accumulates every cookie the site hands out (homepage visit, API
//! responses) so later runs present the same returning-visitor trail. Entries
//! are only ever upserted; nothing is removed.
//!
//! The jar is keyed by cookie name alone. Domain, path, and expiry attributes
//! are ignored because every request targets a single origin.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::capture::CookieCapture;
use super::storage::{self, read_json, write_json};

/// Jar snapshots older than this are re-collected from the homepage.
pub const JAR_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Reserved cookie name carrying the caller's session credential.
pub const SESSION_COOKIE_NAME: &str = "reddit_session";

#[derive(Debug, Serialize, Deserialize)]
struct JarSnapshot {
    cookies: BTreeMap<String, String>,
    #[serde(default)]
    collected_at: f64,
}

/// How a [`CookieJar::warm_up`] call resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum WarmUpOutcome {
    /// The in-memory jar was still fresh.
    AlreadyFresh,
    /// A fresh snapshot was adopted from disk.
    LoadedFromDisk {
        /// Number of cookies adopted.
        cookies: usize,
    },
    /// The homepage was visited and its cookies collected.
    Collected {
        /// Number of cookies set by the homepage.
        cookies: usize,
    },
    /// The homepage visit failed; the jar is marked collected anyway.
    VisitFailed {
        /// Transport error description.
        reason: String,
    },
}

/// Everything needed to simulate a first page load.
#[derive(Debug)]
pub struct HomepageVisit<'a> {
    /// Transport to issue the request with.
    pub http: &'a Client,
    /// Site root.
    pub url: &'a Url,
    /// Navigation-style browser headers.
    pub headers: HeaderMap,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Cookie provider registered on `http`; holds every hop's cookies.
    pub captured: &'a CookieCapture,
}

/// Name → value cookie store persisted as JSON.
pub struct CookieJar {
    path: Option<PathBuf>,
    cookies: BTreeMap<String, String>,
    collected_at: Option<SystemTime>,
    max_age: Duration,
}

// Cookie values are credentials; never print them.
impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("path", &self.path)
            .field("names", &self.cookies.keys().collect::<Vec<_>>())
            .field("collected_at", &self.collected_at)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl CookieJar {
    /// Creates an empty jar persisted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cookies: BTreeMap::new(),
            collected_at: None,
            max_age: JAR_MAX_AGE,
        }
    }

    /// Creates an empty jar that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cookies: BTreeMap::new(),
            collected_at: None,
            max_age: JAR_MAX_AGE,
        }
    }

    /// Creates a jar at the default config location, or an in-memory jar
    /// when no config directory exists.
    #[must_use]
    pub fn at_default_location() -> Self {
        match storage::cookie_jar_path() {
            Ok(path) => Self::new(path),
            Err(error) => {
                warn!(error = %error, "no config directory; cookie jar will not persist");
                Self::in_memory()
            }
        }
    }

    /// Overrides the freshness window.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of cookies held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// When the jar was last collected, if ever.
    #[must_use]
    pub fn collected_at(&self) -> Option<SystemTime> {
        self.collected_at
    }

    /// Point read of a single cookie.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Whether the in-memory jar was collected within the freshness window.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.collected_at
            .is_some_and(|collected| age_of(collected) < self.max_age)
    }

    /// Ensures the jar holds a fresh set of browser cookies.
    ///
    /// Order of preference: fresh in-memory jar, fresh on-disk snapshot, a new
    /// homepage visit. A failed visit still marks the jar collected so callers
    /// are never blocked by it.
    #[instrument(level = "debug", skip_all, fields(url = %visit.url))]
    pub async fn warm_up(&mut self, visit: HomepageVisit<'_>) -> WarmUpOutcome {
        if self.is_fresh() {
            debug!("cookie jar still fresh");
            return WarmUpOutcome::AlreadyFresh;
        }

        if self.cookies.is_empty()
            && let Some(snapshot) = self.read_snapshot()
        {
            let collected = from_unix_seconds(snapshot.collected_at);
            if age_of(collected) < self.max_age {
                let count = snapshot.cookies.len();
                self.cookies = snapshot.cookies;
                self.collected_at = Some(collected);
                debug!(cookies = count, "adopted cookie jar snapshot from disk");
                return WarmUpOutcome::LoadedFromDisk { cookies: count };
            }
            // Stale cookies stay as a base; the visit below refreshes them.
            debug!(cookies = snapshot.cookies.len(), "cookie jar snapshot is stale");
            self.cookies = snapshot.cookies;
        }

        let result = visit
            .http
            .get(visit.url.clone())
            .headers(visit.headers)
            .timeout(visit.timeout)
            .send()
            .await;

        self.collected_at = Some(SystemTime::now());
        // Redirect hops may set cookies even when the final hop fails.
        let collected = visit.captured.take();
        match result {
            Ok(response) => {
                let count = collected.len();
                debug!(status = response.status().as_u16(), cookies = count, "homepage visited");
                self.upsert(collected);
                self.persist();
                WarmUpOutcome::Collected { cookies: count }
            }
            Err(error) => {
                warn!(error = %error, "homepage visit failed; continuing with existing cookies");
                if !collected.is_empty() {
                    self.upsert(collected);
                    self.persist();
                }
                WarmUpOutcome::VisitFailed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Upserts response cookies and persists the full jar.
    ///
    /// Merging the same cookies twice leaves the jar unchanged. An empty batch
    /// does not touch disk.
    pub fn merge<I, N, V>(&mut self, cookies: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let before = self.cookies.len();
        let changed = self.upsert(cookies);
        if changed == 0 {
            return;
        }

        // Activity keeps the trail fresh across runs.
        self.collected_at = Some(SystemTime::now());
        debug!(
            updated = changed,
            added = self.cookies.len() - before,
            "merged response cookies"
        );
        self.persist();
    }

    /// Builds the `Cookie` header value for an authenticated request.
    ///
    /// Every jar entry except the reserved session name is emitted, then the
    /// session name bound to `secret` is appended, so a stale copy in the jar
    /// can never shadow the current credential.
    #[must_use]
    pub fn combined_header(&self, secret: &str) -> String {
        let mut parts: Vec<String> = self
            .cookies
            .iter()
            .filter(|(name, _)| name.as_str() != SESSION_COOKIE_NAME)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        parts.push(format!("{SESSION_COOKIE_NAME}={secret}"));
        parts.join("; ")
    }

    fn upsert<I, N, V>(&mut self, cookies: I) -> usize
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut seen = 0;
        for (name, value) in cookies {
            self.cookies.insert(name.into(), value.into());
            seen += 1;
        }
        seen
    }

    fn read_snapshot(&self) -> Option<JarSnapshot> {
        let path = self.path.as_deref()?;
        match read_json::<JarSnapshot>(path) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                debug!(error = %error, "ignoring unreadable cookie jar snapshot");
                None
            }
        }
    }

    fn persist(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };

        let snapshot = JarSnapshot {
            cookies: self.cookies.clone(),
            collected_at: to_unix_seconds(self.collected_at.unwrap_or_else(SystemTime::now)),
        };
        if let Err(error) = write_json(path, &snapshot) {
            warn!(error = %error, path = %path.display(), "failed to persist cookie jar");
        }
    }
}

/// Extracts the `name=value` pair from one `Set-Cookie` header.
///
/// Attributes after the first `;` are dropped. Headers without a name yield
/// `None`.
pub(super) fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');
    Some((name.to_string(), value.to_string()))
}

fn age_of(collected: SystemTime) -> Duration {
    // Timestamps from the future count as brand new.
    SystemTime::now()
        .duration_since(collected)
        .unwrap_or(Duration::ZERO)
}

fn to_unix_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

fn from_unix_seconds(seconds: f64) -> SystemTime {
    Duration::try_from_secs_f64(seconds)
        .map(|offset| UNIX_EPOCH + offset)
        .unwrap_or(UNIX_EPOCH)
}
