//! Session client and its supporting pieces.
//!
//! - [`SessionClient`]: lazy bootstrap plus jittered GET/POST
//! - [`RateLimiter`]: pause decisions from quota headers
//! - [`Waiter`]: injectable delay strategy
//! - [`ClientError`]: upstream failures, including the distinguished 403

mod bootstrap;
mod config;
pub mod constants;
mod error;
mod headers;
mod rate_limiter;
mod session;
mod transport;
mod wait;

pub use bootstrap::{BootstrapReport, BootstrapStep, StepOutcome};
pub use config::ClientConfig;
pub use error::{BLOCKED_SUGGESTION, ClientError};
pub use headers::{ApiHeaderContext, api_headers, navigation_headers};
pub use rate_limiter::{RateLimitState, RateLimiter};
pub use session::{SessionClient, SessionClientBuilder};
pub use wait::{JitterBand, JitterPolicy, NoWait, TokioWaiter, Waiter};
