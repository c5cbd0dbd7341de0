//! Structured health reporting for probe lifecycle events.

use std::sync::Arc;

use kubeprobe_config::Config;

use crate::HEALTH_TARGET;
use crate::bootstrap::BootstrapError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn probe_starting(&self);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after the probe bound its controls.
    fn probe_started(&self, config: &Config, controls: usize);

    /// Invoked after the probe removed its controls.
    fn probe_stopped(&self, config: &Config);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn probe_starting(&self) {
        (**self).probe_starting();
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn probe_started(&self, config: &Config, controls: usize) {
        (**self).probe_started(config, controls);
    }

    fn probe_stopped(&self, config: &Config) {
        (**self).probe_stopped(config);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn probe_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "probe_starting",
            "starting probe bootstrap"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "probe bootstrap failed"
        );
    }

    fn probe_started(&self, config: &Config, controls: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "probe_started",
            probe = config.probe_id(),
            controls,
            log_filter = config.log_filter(),
            log_format = %config.log_format(),
            "probe controls registered"
        );
    }

    fn probe_stopped(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "probe_stopped",
            probe = config.probe_id(),
            "probe controls deregistered"
        );
    }
}
