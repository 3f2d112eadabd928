//! Browser-shaped request headers.
//!
//! Two presets: a top-level navigation (the homepage cookie visit) and the
//! same-origin `fetch()` calls the site's own frontend makes to its JSON API.
//! Both claim Chrome 131 on macOS to match [`BROWSER_USER_AGENT`].

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, ORIGIN,
    REFERER, USER_AGENT,
};

use super::constants::BROWSER_USER_AGENT;
use super::error::ClientError;

const SEC_CH_UA: &str = r#""Chromium";v="131", "Not_A Brand";v="24""#;
const NAVIGATION_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8";

/// Per-request inputs to [`api_headers`].
#[derive(Debug, Clone, Copy)]
pub struct ApiHeaderContext<'a> {
    /// Combined `Cookie` header value.
    pub cookie: &'a str,
    /// Site origin, e.g. `https://www.reddit.com`.
    pub origin: &'a str,
    /// Page the request pretends to come from; defaults to the site root.
    pub referer: Option<&'a str>,
    /// Value for `x-csrf-token`, when known.
    pub csrf_token: Option<&'a str>,
    /// Value for `x-reddit-loid`, when known.
    pub loid: Option<&'a str>,
    /// Value for `x-modhash`, when known. Only sent on form posts.
    pub modhash: Option<&'a str>,
    /// Whether the request is a form POST.
    pub is_post: bool,
}

/// Headers for a top-level page navigation with no prior site state.
#[must_use]
pub fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(NAVIGATION_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    insert_client_hints(&mut headers);
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers
}

/// Headers for an authenticated same-origin API call.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] if a cookie, token, or referer value
/// contains bytes HTTP headers cannot carry.
pub fn api_headers(ctx: &ApiHeaderContext<'_>) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers.insert(ORIGIN, value("origin", ctx.origin)?);
    let default_referer = format!("{}/", ctx.origin.trim_end_matches('/'));
    headers.insert(
        REFERER,
        value("referer", ctx.referer.unwrap_or(&default_referer))?,
    );
    insert_client_hints(&mut headers);
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(COOKIE, value("cookie", ctx.cookie)?);

    if let Some(token) = ctx.csrf_token.filter(|t| !t.is_empty()) {
        headers.insert(
            HeaderName::from_static("x-csrf-token"),
            value("x-csrf-token", token)?,
        );
    }
    if let Some(loid) = ctx.loid.filter(|l| !l.is_empty()) {
        headers.insert(
            HeaderName::from_static("x-reddit-loid"),
            value("x-reddit-loid", loid)?,
        );
    }
    if ctx.is_post {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        if let Some(modhash) = ctx.modhash.filter(|m| !m.is_empty()) {
            headers.insert(
                HeaderName::from_static("x-modhash"),
                value("x-modhash", modhash)?,
            );
        }
    }

    Ok(headers)
}

fn insert_client_hints(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(SEC_CH_UA),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"macOS\""),
    );
}

fn value(name: &'static str, raw: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(raw).map_err(|_| ClientError::InvalidHeader { name })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx<'a>(cookie: &'a str) -> ApiHeaderContext<'a> {
        ApiHeaderContext {
            cookie,
            origin: "https://www.reddit.com",
            referer: None,
            csrf_token: None,
            loid: None,
            modhash: None,
            is_post: false,
        }
    }

    fn get<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_navigation_headers_look_like_page_load() {
        let headers = navigation_headers();
        assert_eq!(get(&headers, "sec-fetch-mode"), Some("navigate"));
        assert_eq!(get(&headers, "sec-fetch-site"), Some("none"));
        assert!(get(&headers, "accept").unwrap().starts_with("text/html"));
        assert!(get(&headers, "user-agent").unwrap().contains("Chrome/131"));
        assert!(headers.get("cookie").is_none(), "no credential on navigation");
    }

    #[test]
    fn test_api_headers_default_referer_is_site_root() {
        let headers = api_headers(&ctx("reddit_session=s")).unwrap();
        assert_eq!(get(&headers, "referer"), Some("https://www.reddit.com/"));
        assert_eq!(get(&headers, "origin"), Some("https://www.reddit.com"));
        assert_eq!(get(&headers, "cookie"), Some("reddit_session=s"));
        assert_eq!(get(&headers, "sec-fetch-mode"), Some("cors"));
        assert_eq!(get(&headers, "sec-ch-ua-platform"), Some("\"macOS\""));
    }

    #[test]
    fn test_api_headers_optional_tokens_only_when_known() {
        let headers = api_headers(&ctx("c=1")).unwrap();
        assert!(headers.get("x-csrf-token").is_none());
        assert!(headers.get("x-reddit-loid").is_none());

        let mut with_tokens = ctx("c=1");
        with_tokens.csrf_token = Some("tok");
        with_tokens.loid = Some("");
        let headers = api_headers(&with_tokens).unwrap();
        assert_eq!(get(&headers, "x-csrf-token"), Some("tok"));
        assert!(headers.get("x-reddit-loid").is_none(), "empty loid skipped");
    }

    #[test]
    fn test_api_headers_modhash_only_on_post() {
        let mut context = ctx("c=1");
        context.modhash = Some("mh");
        let get_headers = api_headers(&context).unwrap();
        assert!(get_headers.get("x-modhash").is_none());
        assert!(get_headers.get("content-type").is_none());

        context.is_post = true;
        let post_headers = api_headers(&context).unwrap();
        assert_eq!(get(&post_headers, "x-modhash"), Some("mh"));
        assert_eq!(
            get(&post_headers, "content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_api_headers_rejects_control_characters() {
        let result = api_headers(&ctx("reddit_session=bad\nvalue"));
        assert!(matches!(
            result,
            Err(ClientError::InvalidHeader { name: "cookie" })
        ));
    }
}
