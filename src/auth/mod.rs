//! Session credential, device identity, and cookie persistence.
//!
//! Everything here is file-backed and shared by every invocation on the
//! machine, in contrast to the per-client state kept in [`crate::client`].

mod capture;
mod credentials;
mod identity;
mod jar;
mod storage;

pub use capture::CookieCapture;
pub use credentials::{
    CredentialError, SESSION_ENV_VAR, SessionCredential, find_env_file, parse_env_file,
    resolve_credentials,
};
pub use identity::{DeviceIdentity, DeviceIdentityStore, IdentityResolution, IdentitySource};
pub use jar::{CookieJar, HomepageVisit, JAR_MAX_AGE, SESSION_COOKIE_NAME, WarmUpOutcome};
pub use storage::{
    StorageError, config_dir, cookie_jar_path, cookie_jar_path_in, identity_path, identity_path_in,
};
