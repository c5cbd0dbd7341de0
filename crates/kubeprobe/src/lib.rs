//! Kubernetes control dispatch for the cluster probe.
//!
//! Remote callers address controls at topology nodes: delete this pod, tail
//! that pod's logs, describe a storage class. The probe resolves the node
//! identifier against its local resource cache, runs the matching action
//! through the cluster client, and answers with a typed
//! [`ControlResponse`](kubeprobe_report::ControlResponse). Streaming actions
//! hand back a pipe identifier the caller attaches to.
//!
//! The crate wires those pieces together behind a small lifecycle:
//! [`bootstrap_with`] loads configuration, installs structured telemetry and
//! returns an inactive [`Probe`]. [`Probe::start`] binds every Kubernetes
//! control in one atomic batch and [`Probe::stop`] (or dropping the probe)
//! removes them again. The cluster client, the resource cache and the pipe
//! transport are supplied by the embedding process as trait objects; see the
//! [`kubernetes`] module.

mod bootstrap;
mod health;
pub mod kubernetes;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ClusterCollaborators, ConfigLoader, Probe, StaticConfigLoader,
    SystemConfigLoader, bootstrap, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};

/// Tracing target for Kubernetes control handlers.
pub(crate) const KUBERNETES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::kubernetes");

/// Tracing target for lifecycle health events.
pub(crate) const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

#[cfg(test)]
mod tests;
