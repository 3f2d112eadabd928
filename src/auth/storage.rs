//! File-backed persistence for session artifacts.
//!
//! Device identity and the cookie jar live side by side in the per-user config
//! directory: `~/.config/bird-reddit/` (or `$XDG_CONFIG_HOME/bird-reddit/`).
//! Both files are plain JSON, rewritten in full on every save, with no locking.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

const APP_DIR_NAME: &str = "bird-reddit";
const IDENTITY_FILE_NAME: &str = "session.json";
const COOKIE_FILE_NAME: &str = "cookies.json";

/// Errors for persisted session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No suitable user config directory is available.
    #[error("unable to determine config directory (set XDG_CONFIG_HOME or HOME)")]
    ConfigDirUnavailable,
    /// Filesystem I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Returns the per-application config directory.
///
/// # Errors
///
/// Returns [`StorageError::ConfigDirUnavailable`] if no usable config dir is found.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    resolve_config_dir(
        sanitize_env_path(env::var_os("XDG_CONFIG_HOME")),
        sanitize_env_path(env::var_os("HOME")),
        sanitize_env_path(env::var_os("APPDATA")),
    )
}

/// Returns the default device identity path (`<config>/session.json`).
///
/// # Errors
///
/// Returns [`StorageError::ConfigDirUnavailable`] if no usable config dir is found.
pub fn identity_path() -> Result<PathBuf, StorageError> {
    Ok(identity_path_in(&config_dir()?))
}

/// Device identity path inside an explicit state directory.
#[must_use]
pub fn identity_path_in(dir: &Path) -> PathBuf {
    dir.join(IDENTITY_FILE_NAME)
}

/// Returns the default cookie jar path (`<config>/cookies.json`).
///
/// # Errors
///
/// Returns [`StorageError::ConfigDirUnavailable`] if no usable config dir is found.
pub fn cookie_jar_path() -> Result<PathBuf, StorageError> {
    Ok(cookie_jar_path_in(&config_dir()?))
}

/// Cookie jar path inside an explicit state directory.
#[must_use]
pub fn cookie_jar_path_in(dir: &Path) -> PathBuf {
    dir.join(COOKIE_FILE_NAME)
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }

    Some(PathBuf::from(value))
}

fn resolve_config_dir(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    app_data: Option<PathBuf>,
) -> Result<PathBuf, StorageError> {
    if let Some(xdg) = xdg_config_home {
        return Ok(xdg.join(APP_DIR_NAME));
    }
    if let Some(home) = home {
        return Ok(home.join(".config").join(APP_DIR_NAME));
    }
    if let Some(app_data) = app_data {
        return Ok(app_data.join(APP_DIR_NAME));
    }

    Err(StorageError::ConfigDirUnavailable)
}

/// Reads a JSON record, returning `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Writes a JSON record, creating parent directories as needed.
///
/// The file is replaced in place (no temp file + rename), so a concurrent
/// writer can clobber it.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut payload = serde_json::to_string_pretty(value)?;
    payload.push('\n');
    fs::write(path, payload)?;
    set_owner_only_permissions(path)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}
