//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use kubeprobe_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    ProbeStarting,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Controls were bound; carries the registry size.
    ProbeStarted(usize),
    /// Controls were removed.
    ProbeStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn probe_starting(&self) {
        self.record(HealthEvent::ProbeStarting);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn probe_started(&self, _config: &Config, controls: usize) {
        self.record(HealthEvent::ProbeStarted(controls));
    }

    fn probe_stopped(&self, _config: &Config) {
        self.record(HealthEvent::ProbeStopped);
    }
}
