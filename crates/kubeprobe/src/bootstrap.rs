//! Probe bootstrap and lifecycle.

use std::fmt;
use std::sync::Arc;

use kubeprobe_config::Config;
use kubeprobe_controls::{HandlerRegistry, PipeClient};
use kubeprobe_report::{ControlRequest, ControlResponse};
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::kubernetes::{ClusterClient, KubernetesControls, ResourceCache};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the probe configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// External services the Kubernetes controls act through.
#[derive(Clone)]
pub struct ClusterCollaborators {
    /// Client for the cluster API.
    pub client: Arc<dyn ClusterClient>,
    /// Cache of observed cluster resources.
    pub cache: Arc<dyn ResourceCache>,
    /// Transport that exposes pipes to remote callers.
    pub pipes: Arc<dyn PipeClient>,
}

impl fmt::Debug for ClusterCollaborators {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClusterCollaborators")
            .finish_non_exhaustive()
    }
}

/// A bootstrapped probe.
///
/// A probe starts inactive. [`Probe::start`] binds the Kubernetes controls in
/// its registry and [`Probe::stop`] removes them; both are no-ops when the
/// probe is already in the requested state. Dropping an active probe stops
/// it.
pub struct Probe {
    config: Config,
    registry: Arc<HandlerRegistry>,
    controls: Arc<KubernetesControls>,
    reporter: Arc<dyn HealthReporter>,
    telemetry: TelemetryHandle,
    active: bool,
}

impl Probe {
    fn new(
        config: Config,
        controls: KubernetesControls,
        reporter: Arc<dyn HealthReporter>,
        telemetry: TelemetryHandle,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(HandlerRegistry::new()),
            controls: Arc::new(controls),
            reporter,
            telemetry,
            active: false,
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Registry the probe binds its controls in.
    ///
    /// Other integrations may bind their own controls here; the probe only
    /// ever removes the identifiers it added.
    #[must_use]
    pub const fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Returns `true` while the Kubernetes controls are bound.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Binds the Kubernetes controls.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.controls.register(&self.registry);
        self.active = true;
        self.reporter
            .probe_started(&self.config, self.registry.len());
    }

    /// Removes the Kubernetes controls.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.controls.deregister(&self.registry);
        self.active = false;
        self.reporter.probe_stopped(&self.config);
    }

    /// Dispatches a control request through the probe's registry.
    #[must_use]
    pub fn handle(&self, request: &ControlRequest) -> ControlResponse {
        self.registry.handle(request)
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Probe")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Bootstraps a probe with the system configuration and tracing reporter.
///
/// # Errors
///
/// See [`bootstrap_with`].
pub fn bootstrap(collaborators: ClusterCollaborators) -> Result<Probe, BootstrapError> {
    bootstrap_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        collaborators,
    )
}

/// Bootstraps a probe using the supplied collaborators.
///
/// The returned probe is inactive; call [`Probe::start`] to bind its
/// controls.
///
/// # Errors
///
/// Returns [`BootstrapError::Configuration`] when the loader fails and
/// [`BootstrapError::Telemetry`] when the log filter is invalid. The
/// reporter is told about either failure.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    collaborators: ClusterCollaborators,
) -> Result<Probe, BootstrapError> {
    reporter.probe_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let ClusterCollaborators {
        client,
        cache,
        pipes,
    } = collaborators;
    let controls = KubernetesControls::new(client, cache, pipes);
    Ok(Probe::new(config, controls, reporter, telemetry))
}
