//! HTTP transport construction.
//!
//! The transport has no default user agent and its cookie provider only
//! records what responses set. The session client writes the `Cookie` header
//! and browser identity itself on every request, so the jar stays the single
//! source of truth.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use super::error::ClientError;
use crate::auth::CookieCapture;

/// Builds the shared transport with `captured` as its cookie provider, so
/// cookies set on redirect hops are seen too.
///
/// # Errors
///
/// Returns [`ClientError::ClientBuild`] when the builder rejects the
/// configuration.
pub(crate) fn build_transport(
    connect_timeout: Duration,
    request_timeout: Duration,
    captured: &Arc<CookieCapture>,
) -> Result<Client, ClientError> {
    match try_build(connect_timeout, request_timeout, captured, false) {
        Ok(client) => Ok(client),
        Err(BuildFailure::Panic) => {
            // Some sandboxed macOS environments panic while reading system
            // proxy settings; env proxies still apply on the fallback path.
            warn!("HTTP client builder panicked loading system proxy settings; using env-proxy fallback");
            match try_build(connect_timeout, request_timeout, captured, true) {
                Ok(client) => Ok(client),
                Err(BuildFailure::Build(error)) => Err(ClientError::ClientBuild(error)),
                Err(BuildFailure::Panic) => {
                    // Last resort: a plain client without any proxy lookup.
                    Client::builder()
                        .no_proxy()
                        .cookie_provider(Arc::clone(captured))
                        .build()
                        .map_err(ClientError::ClientBuild)
                }
            }
        }
        Err(BuildFailure::Build(error)) => Err(ClientError::ClientBuild(error)),
    }
}

enum BuildFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build(
    connect_timeout: Duration,
    request_timeout: Duration,
    captured: &Arc<CookieCapture>,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildFailure> {
    let captured = Arc::clone(captured);
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(connect_timeout, request_timeout, captured);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildFailure::Build)
    }))
    .map_err(|_| BuildFailure::Panic)?
}

fn base_builder(
    connect_timeout: Duration,
    request_timeout: Duration,
    captured: Arc<CookieCapture>,
) -> ClientBuilder {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .gzip(true)
        .cookie_provider(captured)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
