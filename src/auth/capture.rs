//! Per-hop `Set-Cookie` capture for the HTTP transport.
//!
//! The transport follows redirects on its own, so only a cookie provider sees
//! the headers of intermediate hops. [`CookieCapture`] records every cookie
//! from every hop until the session drains it into the [`CookieJar`].
//!
//! It never supplies a `Cookie` header: requests carry the one the session
//! builds from the jar, and same-origin redirects keep it.
//!
//! [`CookieJar`]: super::CookieJar

use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use tracing::trace;
use url::Url;

use super::jar::parse_set_cookie;

/// Cookies seen on responses but not yet merged into the jar.
#[derive(Debug, Default)]
pub struct CookieCapture {
    pending: Mutex<Vec<(String, String)>>,
}

impl CookieCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything captured so far, in arrival order.
    pub fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieStore for CookieCapture {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies: Vec<_> = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();
        if cookies.is_empty() {
            return;
        }
        trace!(url = %url, count = cookies.len(), "captured response cookies");
        self.lock().extend(cookies);
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn capture_headers(capture: &CookieCapture, raw: &[&'static str]) {
        let values: Vec<_> = raw.iter().map(|v| HeaderValue::from_static(*v)).collect();
        let url = Url::parse("https://www.reddit.com/").unwrap();
        capture.set_cookies(&mut values.iter(), &url);
    }

    #[test]
    fn test_capture_parses_set_cookie_headers() {
        let capture = CookieCapture::new();
        capture_headers(
            &capture,
            &[
                "loid=abc123; Domain=.reddit.com; Path=/; Secure",
                "csrf_token=\"tok\"; Path=/",
                "=nameless; Path=/",
                "no-equals-sign",
            ],
        );

        assert_eq!(
            capture.take(),
            vec![
                ("loid".to_string(), "abc123".to_string()),
                ("csrf_token".to_string(), "tok".to_string()),
            ]
        );
    }

    #[test]
    fn test_capture_keeps_empty_values() {
        let capture = CookieCapture::new();
        capture_headers(&capture, &["session_tracker=; Max-Age=0"]);
        assert_eq!(capture.take(), vec![("session_tracker".into(), String::new())]);
    }

    #[test]
    fn test_take_drains_hops_in_order() {
        let capture = CookieCapture::new();
        capture_headers(&capture, &["loid=first-hop"]);
        capture_headers(&capture, &["edgebucket=eb", "loid=second-hop"]);

        let drained = capture.take();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0], ("loid".into(), "first-hop".into()));
        assert_eq!(drained[2], ("loid".into(), "second-hop".into()));
        assert!(capture.take().is_empty());
    }

    #[test]
    fn test_never_supplies_cookie_header() {
        let capture = CookieCapture::new();
        capture_headers(&capture, &["loid=abc"]);
        let url = Url::parse("https://www.reddit.com/").unwrap();
        assert!(capture.cookies(&url).is_none());
    }
}
