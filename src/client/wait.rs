//! Human-cadence delays.
//!
//! Every deliberate pause goes through a [`Waiter`] so tests can swap real
//! sleeps for [`NoWait`], which returns immediately and records what was asked.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::constants::{PRE_BOOTSTRAP_JITTER_MS, PRE_BROWSE_JITTER_MS, PRE_POST_JITTER_MS};

/// Single capability: wait this long.
#[async_trait]
pub trait Waiter: Send + Sync + fmt::Debug {
    /// Suspends for `duration`. Not cancellable.
    async fn wait(&self, duration: Duration);
}

/// Real timed sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioWaiter;

#[async_trait]
impl Waiter for TokioWaiter {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Zero-delay waiter that remembers every requested duration.
///
/// Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct NoWait {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl NoWait {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<Duration> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Waiter for NoWait {
    async fn wait(&self, duration: Duration) {
        if let Ok(mut guard) = self.requested.lock() {
            guard.push(duration);
        }
    }
}

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBand {
    min: Duration,
    max: Duration,
}

impl JitterBand {
    /// Creates a band; bounds given in the wrong order are swapped.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Creates a band from millisecond bounds.
    #[must_use]
    pub fn from_millis((min, max): (u64, u64)) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    /// A band that always yields zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Whether `duration` falls inside the band.
    #[must_use]
    pub fn contains(&self, duration: Duration) -> bool {
        duration >= self.min && duration <= self.max
    }

    /// Draws a uniformly random delay at millisecond resolution.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min == max {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Delay bands for the three suspension points.
///
/// Defaults are the short bands: enough to break a machine-regular cadence
/// without making interactive use sluggish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterPolicy {
    /// Before the bootstrap identity call.
    pub pre_bootstrap: JitterBand,
    /// Before the popular-listing warm-up.
    pub pre_browse: JitterBand,
    /// Before every POST, unless jitter is disabled.
    pub pre_post: JitterBand,
}

impl Default for JitterPolicy {
    fn default() -> Self {
        Self {
            pre_bootstrap: JitterBand::from_millis(PRE_BOOTSTRAP_JITTER_MS),
            pre_browse: JitterBand::from_millis(PRE_BROWSE_JITTER_MS),
            pre_post: JitterBand::from_millis(PRE_POST_JITTER_MS),
        }
    }
}
