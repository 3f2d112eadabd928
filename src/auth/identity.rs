//! Stable per-installation device identity.
//!
//! A fresh identifier on every run looks like device rotation, so one UUID is
//! generated on first use and reused by every later invocation on the machine.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::storage::{self, StorageError, read_json, write_json};

/// Persisted identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Opaque stable identifier.
    #[serde(rename = "device_id")]
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl DeviceIdentity {
    fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Where a resolved identity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// Already resolved earlier by this store.
    Cached,
    /// Read from the identity file.
    Loaded,
    /// Generated and written to the identity file.
    Created,
    /// Generated for this run only; storage could not be used.
    Transient {
        /// Why the identity could not be persisted.
        reason: String,
    },
}

/// Result of [`DeviceIdentityStore::resolve`].
#[derive(Debug, Clone)]
pub struct IdentityResolution {
    /// The resolved identifier.
    pub id: String,
    /// Where it came from.
    pub source: IdentitySource,
}

/// Loads or creates the device identity and caches it for the store's lifetime.
#[derive(Debug, Default)]
pub struct DeviceIdentityStore {
    path: Option<PathBuf>,
    cached: Option<DeviceIdentity>,
}

impl DeviceIdentityStore {
    /// Creates a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cached: None,
        }
    }

    /// Creates a store at the default config location.
    ///
    /// When no config directory can be found the store still works, but every
    /// resolution is transient.
    #[must_use]
    pub fn at_default_location() -> Self {
        match storage::identity_path() {
            Ok(path) => Self::new(path),
            Err(error) => {
                warn!(error = %error, "no config directory; device identity will not persist");
                Self::default()
            }
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the device identifier, never failing.
    pub fn get_identity(&mut self) -> String {
        self.resolve().id
    }

    /// Resolves the device identifier and reports where it came from.
    ///
    /// Storage failures degrade to a transient identifier that is cached for
    /// the remainder of this store's lifetime but never written.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&mut self) -> IdentityResolution {
        if let Some(cached) = &self.cached {
            return IdentityResolution {
                id: cached.id.clone(),
                source: IdentitySource::Cached,
            };
        }

        let (identity, source) = match self.load_or_create() {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(error = %error, "device identity storage unavailable; using transient id");
                (
                    DeviceIdentity::generate(),
                    IdentitySource::Transient {
                        reason: error.to_string(),
                    },
                )
            }
        };

        let id = identity.id.clone();
        self.cached = Some(identity);
        IdentityResolution { id, source }
    }

    fn load_or_create(&self) -> Result<(DeviceIdentity, IdentitySource), StorageError> {
        let path = self.path.as_deref().ok_or(StorageError::ConfigDirUnavailable)?;

        match read_json::<DeviceIdentity>(path) {
            Ok(Some(existing)) if !existing.id.trim().is_empty() => {
                debug!(path = %path.display(), "loaded device identity");
                return Ok((existing, IdentitySource::Loaded));
            }
            Ok(_) => {}
            Err(error) => {
                // Unreadable record is replaced below.
                debug!(error = %error, "discarding unreadable device identity");
            }
        }

        let fresh = DeviceIdentity::generate();
        write_json(path, &fresh)?;
        debug!(path = %path.display(), "created device identity");
        Ok((fresh, IdentitySource::Created))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn test_first_resolution_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let mut store = DeviceIdentityStore::new(&path);

        let resolution = store.resolve();

        assert_eq!(resolution.source, IdentitySource::Created);
        assert!(path.exists());
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("device_id"), "record uses device_id key: {raw}");
        assert!(raw.contains(&resolution.id));
    }

    #[test]
    fn test_resolution_is_idempotent_within_store() {
        let temp = TempDir::new().unwrap();
        let mut store = DeviceIdentityStore::new(temp.path().join("session.json"));

        let first = store.get_identity();
        let second = store.resolve();

        assert_eq!(first, second.id);
        assert_eq!(second.source, IdentitySource::Cached);
    }

    #[test]
    fn test_resolution_is_stable_across_stores() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");

        let first = DeviceIdentityStore::new(&path).get_identity();
        let mut later = DeviceIdentityStore::new(&path);
        let second = later.resolve();

        assert_eq!(first, second.id);
        assert_eq!(second.source, IdentitySource::Loaded);
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, "garbage").unwrap();

        let resolution = DeviceIdentityStore::new(&path).resolve();

        assert_eq!(resolution.source, IdentitySource::Created);
        let reloaded = DeviceIdentityStore::new(&path).get_identity();
        assert_eq!(reloaded, resolution.id);
    }

    #[test]
    fn test_empty_id_is_regenerated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, r#"{"device_id": "", "created_at": "x"}"#).unwrap();

        let resolution = DeviceIdentityStore::new(&path).resolve();

        assert_eq!(resolution.source, IdentitySource::Created);
        assert!(!resolution.id.is_empty());
    }

    #[test]
    fn test_unwritable_location_falls_back_to_transient() {
        let temp = TempDir::new().unwrap();
        // A regular file where a directory is expected makes the write fail.
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();
        let mut store = DeviceIdentityStore::new(blocker.join("session.json"));

        let first = store.resolve();
        let second = store.resolve();

        assert!(matches!(first.source, IdentitySource::Transient { .. }));
        assert!(!first.id.is_empty());
        assert_eq!(first.id, second.id, "transient id is cached for the run");
    }

    #[test]
    fn test_store_without_path_is_transient() {
        let mut store = DeviceIdentityStore::default();
        let resolution = store.resolve();
        assert!(matches!(resolution.source, IdentitySource::Transient { .. }));
    }
}
