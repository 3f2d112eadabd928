//! Per-step record of session initialization.
//!
//! Initialization never fails; each step either succeeds or degrades to a safe
//! default. The report keeps the reasons so callers and tests can see which.

use std::fmt;

/// The five initialization steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    /// Load or create the device identity.
    DeviceIdentity,
    /// Simulated homepage visit for browser cookies.
    CookieWarmUp,
    /// Combine jar cookies with the credential.
    CookieHeader,
    /// Authenticated identity call for the modhash.
    TokenFetch,
    /// Popular-listing browse to deepen the cookie trail.
    BrowseWarmUp,
}

impl BootstrapStep {
    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceIdentity => "device_identity",
            Self::CookieWarmUp => "cookie_warm_up",
            Self::CookieHeader => "cookie_header",
            Self::TokenFetch => "token_fetch",
            Self::BrowseWarmUp => "browse_warm_up",
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did what it set out to do.
    Succeeded,
    /// The step fell back to a safe default.
    Degraded {
        /// What went wrong.
        reason: String,
    },
}

impl StepOutcome {
    /// Shorthand for a degraded outcome.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reason: reason.into(),
        }
    }

    /// Whether the step degraded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Ordered outcomes of every attempted step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    steps: Vec<(BootstrapStep, StepOutcome)>,
}

impl BootstrapReport {
    pub(crate) fn record(&mut self, step: BootstrapStep, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    /// All recorded steps in order.
    #[must_use]
    pub fn steps(&self) -> &[(BootstrapStep, StepOutcome)] {
        &self.steps
    }

    /// Outcome for a given step, if it was attempted.
    #[must_use]
    pub fn outcome(&self, step: BootstrapStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(recorded, _)| *recorded == step)
            .map(|(_, outcome)| outcome)
    }

    /// Steps that degraded.
    pub fn degraded(&self) -> impl Iterator<Item = BootstrapStep> + '_ {
        self.steps
            .iter()
            .filter(|(_, outcome)| outcome.is_degraded())
            .map(|(step, _)| *step)
    }

    /// Whether every step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degraded().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tracks_degraded_steps() {
        let mut report = BootstrapReport::default();
        report.record(BootstrapStep::DeviceIdentity, StepOutcome::Succeeded);
        report.record(BootstrapStep::TokenFetch, StepOutcome::degraded("HTTP 401"));

        assert!(!report.is_clean());
        assert_eq!(
            report.degraded().collect::<Vec<_>>(),
            vec![BootstrapStep::TokenFetch]
        );
        assert_eq!(
            report.outcome(BootstrapStep::TokenFetch),
            Some(&StepOutcome::degraded("HTTP 401"))
        );
        assert_eq!(report.outcome(BootstrapStep::BrowseWarmUp), None);
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(BootstrapReport::default().is_clean());
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(BootstrapStep::CookieWarmUp.to_string(), "cookie_warm_up");
    }
}
