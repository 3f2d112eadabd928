//! The session client: lazy bootstrap plus jittered GET/POST.
//!
//! A client starts uninitialized. The first request runs the five bootstrap
//! steps in order, each best-effort, and the client is initialized afterwards
//! no matter how the steps went. Only genuine upstream failures reach callers.

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderValue;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::bootstrap::{BootstrapReport, BootstrapStep, StepOutcome};
use super::config::ClientConfig;
use super::constants::{BROWSE_WARM_UP_PATH, IDENTITY_PATH};
use super::error::ClientError;
use super::headers::{ApiHeaderContext, api_headers, navigation_headers};
use super::rate_limiter::{RateLimitState, RateLimiter};
use super::transport::build_transport;
use super::wait::{JitterBand, TokioWaiter, Waiter};
use crate::auth::{
    CookieCapture, CookieJar, DeviceIdentityStore, HomepageVisit, IdentitySource,
    SESSION_COOKIE_NAME, SessionCredential, WarmUpOutcome, cookie_jar_path_in, identity_path_in,
};

const CSRF_COOKIE: &str = "csrf_token";
const LOID_COOKIE: &str = "loid";
const MODHASH_FIELD: &str = "uh";

/// Builder for [`SessionClient`].
#[derive(Debug)]
pub struct SessionClientBuilder {
    credential: SessionCredential,
    config: ClientConfig,
    identity: Option<DeviceIdentityStore>,
    jar: Option<CookieJar>,
    waiter: Option<Arc<dyn Waiter>>,
}

impl SessionClientBuilder {
    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses an explicit identity store instead of the configured location.
    #[must_use]
    pub fn identity_store(mut self, store: DeviceIdentityStore) -> Self {
        self.identity = Some(store);
        self
    }

    /// Uses an explicit cookie jar instead of the configured location.
    #[must_use]
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Replaces the wait strategy used for jitter and rate-limit pauses.
    #[must_use]
    pub fn waiter(mut self, waiter: impl Waiter + 'static) -> Self {
        self.waiter = Some(Arc::new(waiter));
        self
    }

    /// Builds the client. No network or disk activity happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredential`] if the credential cannot be
    /// sent in a `Cookie` header, and [`ClientError::ClientBuild`] if the HTTP
    /// transport cannot be constructed.
    pub fn build(self) -> Result<SessionClient, ClientError> {
        let session_cookie = format!("{SESSION_COOKIE_NAME}={}", self.credential.secret());
        if HeaderValue::from_str(&session_cookie).is_err() {
            return Err(ClientError::InvalidCredential);
        }

        let captured = Arc::new(CookieCapture::new());
        let http = build_transport(
            self.config.connect_timeout,
            self.config.request_timeout,
            &captured,
        )?;
        let state_dir = self.config.state_dir.clone();

        let identity = self.identity.unwrap_or_else(|| match &state_dir {
            Some(dir) => DeviceIdentityStore::new(identity_path_in(dir)),
            None => DeviceIdentityStore::at_default_location(),
        });
        let jar = self.jar.unwrap_or_else(|| match &state_dir {
            Some(dir) => CookieJar::new(cookie_jar_path_in(dir)),
            None => CookieJar::at_default_location(),
        });

        Ok(SessionClient {
            credential: self.credential,
            config: self.config,
            http,
            captured,
            identity,
            jar,
            waiter: self.waiter.unwrap_or_else(|| Arc::new(TokioWaiter)),
            rate: RateLimiter::new(),
            state: SessionState::default(),
            report: None,
        })
    }
}

#[derive(Default)]
struct SessionState {
    device_id: Option<String>,
    cookie_header: String,
    modhash: String,
    csrf_token: String,
    loid: String,
    initialized: bool,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("device_id", &self.device_id)
            .field("cookie_header", &"<redacted>")
            .field("has_modhash", &!self.modhash.is_empty())
            .field("has_csrf_token", &!self.csrf_token.is_empty())
            .field("has_loid", &!self.loid.is_empty())
            .field("initialized", &self.initialized)
            .finish()
    }
}

struct ApiResponse {
    url: String,
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    fn decode<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::decode(&self.url, e))
    }

    fn into_status_error(self) -> ClientError {
        ClientError::http_status(self.url, self.status.as_u16(), self.body)
    }
}

#[derive(Deserialize)]
struct IdentityEnvelope {
    #[serde(default)]
    data: Option<IdentityData>,
    #[serde(default)]
    modhash: Option<String>,
}

#[derive(Deserialize)]
struct IdentityData {
    #[serde(default)]
    modhash: Option<String>,
}

/// Authenticated client presenting itself as a returning browser.
///
/// One request is in flight at a time; every request method takes
/// `&mut self`.
#[derive(Debug)]
pub struct SessionClient {
    credential: SessionCredential,
    config: ClientConfig,
    http: Client,
    captured: Arc<CookieCapture>,
    identity: DeviceIdentityStore,
    jar: CookieJar,
    waiter: Arc<dyn Waiter>,
    rate: RateLimiter,
    state: SessionState,
    report: Option<BootstrapReport>,
}

impl SessionClient {
    /// Starts a builder with default configuration.
    #[must_use]
    pub fn builder(credential: SessionCredential) -> SessionClientBuilder {
        SessionClientBuilder {
            credential,
            config: ClientConfig::default(),
            identity: None,
            jar: None,
            waiter: None,
        }
    }

    /// Builds a client with the given configuration and default stores.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ClientBuild`] if the HTTP transport cannot be
    /// constructed.
    pub fn new(credential: SessionCredential, config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder(credential).config(config).build()
    }

    /// Whether the bootstrap sequence has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Per-step bootstrap outcomes, once initialized.
    #[must_use]
    pub fn bootstrap_report(&self) -> Option<&BootstrapReport> {
        self.report.as_ref()
    }

    /// Device identifier resolved during bootstrap.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.state.device_id.as_deref()
    }

    /// Current anti-CSRF form token; empty when bootstrap could not fetch it.
    #[must_use]
    pub fn modhash(&self) -> &str {
        &self.state.modhash
    }

    /// Latest observed quota.
    #[must_use]
    pub fn rate_limits(&self) -> RateLimitState {
        self.rate.state()
    }

    /// The cookie jar backing this client.
    #[must_use]
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute page URL on the configured site, for referers.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        self.config.page_url(path)
    }

    /// Runs the bootstrap sequence once. Later calls are no-ops.
    pub async fn ensure_initialized(&mut self) {
        if !self.state.initialized {
            self.initialize().await;
        }
    }

    /// Authenticated GET decoded as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpStatus`] for any non-success status,
    /// [`ClientError::Decode`] when the body does not match `T`, and transport
    /// errors as [`ClientError::Network`] or [`ClientError::Timeout`].
    #[instrument(level = "debug", skip(self, query))]
    pub async fn get<T: DeserializeOwned>(
        &mut self,
        path: &str,
        query: &[(&str, String)],
        referer: Option<&str>,
    ) -> Result<T, ClientError> {
        self.ensure_initialized().await;
        self.respect_rate_limit().await;

        let response = self.send(Method::GET, path, query, None, referer).await?;
        if !response.status.is_success() {
            return Err(response.into_status_error());
        }
        response.decode()
    }

    /// Authenticated form POST decoded as `T`.
    ///
    /// Sleeps a compose-time jitter first unless disabled, and adds the
    /// modhash to the form when one is known.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Blocked`] on 403, [`ClientError::HttpStatus`] for
    /// any other non-success status, plus the same decode and transport errors
    /// as [`SessionClient::get`].
    #[instrument(level = "debug", skip(self, form))]
    pub async fn post<T: DeserializeOwned>(
        &mut self,
        path: &str,
        mut form: Vec<(&str, String)>,
        referer: Option<&str>,
    ) -> Result<T, ClientError> {
        self.ensure_initialized().await;
        self.respect_rate_limit().await;

        if !self.config.no_jitter {
            self.jitter(self.config.jitter.pre_post).await;
        }
        if !self.state.modhash.is_empty() {
            form.push((MODHASH_FIELD, self.state.modhash.clone()));
        }

        let response = self
            .send(Method::POST, path, &[], Some(form.as_slice()), referer)
            .await?;
        if response.status == StatusCode::FORBIDDEN {
            warn!(url = %response.url, "mutating request blocked with 403");
            return Err(ClientError::blocked(response.url));
        }
        if !response.status.is_success() {
            return Err(response.into_status_error());
        }
        response.decode()
    }

    #[instrument(level = "info", skip(self))]
    async fn initialize(&mut self) {
        let mut report = BootstrapReport::default();

        let identity = self.identity.resolve();
        let outcome = match &identity.source {
            IdentitySource::Transient { reason } => {
                StepOutcome::degraded(format!("transient device id: {reason}"))
            }
            _ => StepOutcome::Succeeded,
        };
        debug!(source = ?identity.source, "device identity resolved");
        report.record(BootstrapStep::DeviceIdentity, outcome);
        self.state.device_id = Some(identity.id);

        let visit = HomepageVisit {
            http: &self.http,
            url: &self.config.base_url,
            headers: navigation_headers(),
            timeout: self.config.homepage_timeout,
            captured: &self.captured,
        };
        let outcome = match self.jar.warm_up(visit).await {
            WarmUpOutcome::VisitFailed { reason } => {
                StepOutcome::degraded(format!("homepage visit failed: {reason}"))
            }
            _ => StepOutcome::Succeeded,
        };
        report.record(BootstrapStep::CookieWarmUp, outcome);

        self.rebuild_cookie_header();
        let outcome = if HeaderValue::from_str(&self.state.cookie_header).is_ok() {
            StepOutcome::Succeeded
        } else {
            StepOutcome::degraded("cookie header contains characters HTTP cannot carry")
        };
        report.record(BootstrapStep::CookieHeader, outcome);
        self.refresh_tokens();

        self.jitter(self.config.jitter.pre_bootstrap).await;
        let outcome = match self.fetch_modhash().await {
            Ok(modhash) if modhash.is_empty() => {
                self.state.modhash.clear();
                StepOutcome::degraded("identity response carried no modhash")
            }
            Ok(modhash) => {
                self.state.modhash = modhash;
                StepOutcome::Succeeded
            }
            Err(error) => {
                self.state.modhash.clear();
                StepOutcome::degraded(error.to_string())
            }
        };
        report.record(BootstrapStep::TokenFetch, outcome);
        self.refresh_tokens();

        self.jitter(self.config.jitter.pre_browse).await;
        let query = [("limit", "2".to_string()), ("raw_json", "1".to_string())];
        let outcome = match self
            .send(Method::GET, BROWSE_WARM_UP_PATH, &query, None, None)
            .await
        {
            Ok(response) if response.status.is_success() => StepOutcome::Succeeded,
            Ok(response) => StepOutcome::degraded(format!("HTTP {}", response.status.as_u16())),
            Err(error) => StepOutcome::degraded(error.to_string()),
        };
        report.record(BootstrapStep::BrowseWarmUp, outcome);

        for step in report.degraded() {
            warn!(step = %step, "bootstrap step degraded");
        }
        info!(
            clean = report.is_clean(),
            cookies = self.jar.len(),
            "session initialized"
        );
        self.state.initialized = true;
        self.report = Some(report);
    }

    async fn fetch_modhash(&mut self) -> Result<String, ClientError> {
        let response = self.send(Method::GET, IDENTITY_PATH, &[], None, None).await?;
        if !response.status.is_success() {
            return Err(response.into_status_error());
        }
        let envelope: IdentityEnvelope = response.decode()?;
        let modhash = match envelope.data {
            Some(data) => data.modhash,
            None => envelope.modhash,
        };
        Ok(modhash.unwrap_or_default())
    }

    /// Issues one request and absorbs its cookies and quota headers.
    ///
    /// Status codes are left to the caller.
    async fn send(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        form: Option<&[(&str, String)]>,
        referer: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.config.endpoint(path)?;
        let origin = self.config.origin();
        let headers = api_headers(&ApiHeaderContext {
            cookie: &self.state.cookie_header,
            origin: &origin,
            referer,
            csrf_token: Some(&self.state.csrf_token),
            loid: Some(&self.state.loid),
            modhash: Some(&self.state.modhash),
            is_post: form.is_some(),
        })?;

        let mut request = self.http.request(method.clone(), url.clone()).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(form) = form {
            request = request.form(form);
        }

        debug!(%method, url = %url, "sending request");
        let result = request.send().await;
        // Every hop's cookies, including those before a failed final hop.
        self.jar.merge(self.captured.take());
        self.rebuild_cookie_header();
        let response = result.map_err(|e| ClientError::transport(url.as_str(), e))?;

        let status = response.status();
        self.rate.observe(response.headers());

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(ApiResponse {
            url: url.to_string(),
            status,
            body,
        })
    }

    async fn respect_rate_limit(&self) {
        if !self.rate.should_pause() {
            return;
        }
        let pause = self.rate.pause_duration();
        warn!(
            seconds = pause.as_secs(),
            remaining = ?self.rate.state().remaining,
            "[rate limit] pausing"
        );
        self.waiter.wait(pause).await;
    }

    async fn jitter(&self, band: JitterBand) {
        let delay = band.sample();
        debug!(millis = delay.as_millis(), "jitter");
        self.waiter.wait(delay).await;
    }

    fn rebuild_cookie_header(&mut self) {
        self.state.cookie_header = self.jar.combined_header(self.credential.secret());
    }

    fn refresh_tokens(&mut self) {
        if let Some(token) = self.jar.lookup(CSRF_COOKIE) {
            self.state.csrf_token = token.to_string();
        }
        if let Some(loid) = self.jar.lookup(LOID_COOKIE) {
            self.state.loid = loid.to_string();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::NoWait;

    fn offline_client(dir: &std::path::Path, waiter: NoWait) -> SessionClient {
        // Port 9 (discard) refuses connections, so every step degrades fast.
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .unwrap()
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(500))
            .with_state_dir(dir);
        SessionClient::builder(SessionCredential::new("secret"))
            .config(config)
            .waiter(waiter)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_does_not_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path(), NoWait::new());
        assert!(!client.is_initialized());
        assert!(client.bootstrap_report().is_none());
        assert!(client.device_id().is_none());
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_still_initializes() {
        let dir = tempfile::tempdir().unwrap();
        let waiter = NoWait::new();
        let mut client = offline_client(dir.path(), waiter.clone());

        client.ensure_initialized().await;

        assert!(client.is_initialized());
        assert!(client.device_id().is_some());
        assert_eq!(client.modhash(), "");
        let report = client.bootstrap_report().unwrap();
        assert_eq!(
            report.degraded().collect::<Vec<_>>(),
            vec![
                BootstrapStep::CookieWarmUp,
                BootstrapStep::TokenFetch,
                BootstrapStep::BrowseWarmUp
            ]
        );
        // Two bootstrap jitters, no rate-limit pause.
        assert_eq!(waiter.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_initialization_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let waiter = NoWait::new();
        let mut client = offline_client(dir.path(), waiter.clone());

        client.ensure_initialized().await;
        let first_id = client.device_id().map(str::to_string);
        client.ensure_initialized().await;

        assert_eq!(client.device_id().map(str::to_string), first_id);
        assert_eq!(waiter.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_get_after_degraded_bootstrap_surfaces_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = offline_client(dir.path(), NoWait::new());

        let result: Result<serde_json::Value, _> = client.get("/api/me.json", &[], None).await;

        assert!(matches!(
            result,
            Err(ClientError::Network { .. } | ClientError::Timeout { .. })
        ));
        assert!(client.is_initialized());
    }

    #[test]
    fn test_build_rejects_credential_unfit_for_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::default().with_state_dir(dir.path());
        let error = SessionClient::builder(SessionCredential::new("line\nbreak"))
            .config(config)
            .build()
            .unwrap_err();

        assert!(matches!(error, ClientError::InvalidCredential));
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_session_state_debug_redacts_cookie_header() {
        let state = SessionState {
            cookie_header: "reddit_session=topsecret".to_string(),
            ..SessionState::default()
        };
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("topsecret"));
    }
}
