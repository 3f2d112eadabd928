//! Session credential resolution.
//!
//! The credential is the browser's `reddit_session` cookie. It is read from the
//! `REDDIT_SESSION` environment variable, falling back to the nearest `.env`
//! file found walking up from the working directory.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable holding the session cookie.
pub const SESSION_ENV_VAR: &str = "REDDIT_SESSION";

const ENV_FILE_NAME: &str = ".env";

/// Errors that can occur while resolving the session credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No credential in the environment or any `.env` file.
    #[error(
        "Missing REDDIT_SESSION cookie.\n\n\
         To get your cookie:\n\
         1. Open reddit.com in your browser and log in\n\
         2. Open DevTools (F12) > Application > Cookies > https://www.reddit.com\n\
         3. Find the cookie named 'reddit_session' and copy its value\n\
         4. Set it in .env:  REDDIT_SESSION=your_value_here\n   \
         Or as env var:  export REDDIT_SESSION=your_value_here"
    )]
    Missing,

    /// A `.env` file was found but could not be read.
    #[error("failed to read {path}: {source}")]
    EnvFile {
        /// The unreadable file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// The caller's session secret.
///
/// Debug output is redacted so the value never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Wraps a raw cookie value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret.
    ///
    /// Sensitive; never log the return value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCredential")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Resolves the credential from the process environment and working directory.
///
/// # Errors
///
/// Returns [`CredentialError::Missing`] when no non-empty value is found, or
/// [`CredentialError::EnvFile`] when a discovered `.env` cannot be read.
pub fn resolve_credentials() -> Result<SessionCredential, CredentialError> {
    let cwd = env::current_dir().ok();
    resolve_from(env::var(SESSION_ENV_VAR).ok(), cwd.as_deref())
}

fn resolve_from(
    env_value: Option<String>,
    start_dir: Option<&Path>,
) -> Result<SessionCredential, CredentialError> {
    if let Some(value) = non_empty(env_value) {
        debug!("session credential taken from environment");
        return Ok(SessionCredential::new(value));
    }

    let Some(env_file) = start_dir.and_then(find_env_file) else {
        return Err(CredentialError::Missing);
    };

    let contents = fs::read_to_string(&env_file).map_err(|source| CredentialError::EnvFile {
        path: env_file.clone(),
        source,
    })?;
    let value = parse_env_file(&contents)
        .into_iter()
        .find(|(key, _)| key == SESSION_ENV_VAR)
        .map(|(_, value)| value);

    match non_empty(value) {
        Some(value) => {
            debug!(path = %env_file.display(), "session credential taken from .env");
            Ok(SessionCredential::new(value))
        }
        None => Err(CredentialError::Missing),
    }
}

/// Finds the nearest `.env` file in `start` or any ancestor.
#[must_use]
pub fn find_env_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(ENV_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Parses `KEY=value` lines; comments, blanks, and `export ` prefixes are handled.
#[must_use]
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
