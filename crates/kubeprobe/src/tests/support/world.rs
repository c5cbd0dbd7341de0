//! BDD test world: owns the collaborators, the probe and the last exchange.

use std::cell::RefCell;
use std::io::Read;
use std::sync::Arc;

use kubeprobe_controls::{LocalPipeRegistry, PipeClient};
use kubeprobe_report::{ControlRequest, ControlResponse, NodeId, ResourceKind};

use crate::bootstrap::{BootstrapError, ClusterCollaborators, ConfigLoader, Probe, bootstrap_with};

use super::cache::InMemoryCache;
use super::client::RecordingClusterClient;
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Application session every scenario talks through.
pub const APP_ID: &str = "app";

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    pub cache: Arc<InMemoryCache>,
    pub client: Arc<RecordingClusterClient>,
    pub pipes: Arc<LocalPipeRegistry>,
    probe: Option<Probe>,
    bootstrap_error: Option<BootstrapError>,
    request: Option<ControlRequest>,
    response: Option<ControlResponse>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader and an open
    /// application session.
    #[must_use]
    pub fn new() -> Self {
        let pipes = Arc::new(LocalPipeRegistry::new());
        pipes.open_session(APP_ID);
        Self {
            loader: Box::new(TestConfigLoader),
            reporter: Arc::new(RecordingHealthReporter::default()),
            cache: Arc::new(InMemoryCache::default()),
            client: Arc::new(RecordingClusterClient::default()),
            pipes,
            probe: None,
            bootstrap_error: None,
            request: None,
            response: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.probe.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        match bootstrap_with(&*self.loader, self.reporter.clone(), self.collaborators()) {
            Ok(probe) => self.probe = Some(probe),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Bootstraps if needed and starts the probe.
    pub fn start(&mut self) {
        self.bootstrap();
        self.probe_mut().start();
    }

    /// Stops the probe.
    pub fn stop(&mut self) {
        self.probe_mut().stop();
    }

    /// Sends a control addressed at a pod.
    pub fn send_to_pod(&mut self, control: &str, namespace: &str, uid: &str) {
        let node_id = NodeId::encode(ResourceKind::Pod, Some(namespace), uid);
        let request = ControlRequest::new(APP_ID, node_id, control);
        self.response = Some(self.probe().handle(&request));
        self.request = Some(request);
    }

    /// Closes the pipe returned by the last response from the remote side.
    pub fn close_pipe_remotely(&self) {
        let pipe_id = self.response().pipe_id().expect("response carries a pipe");
        self.pipes
            .pipe_close(APP_ID, pipe_id)
            .expect("pipe should be registered");
    }

    /// Reads everything the last response's pipe yields.
    pub fn read_pipe(&self) -> Vec<u8> {
        let pipe_id = self.response().pipe_id().expect("response carries a pipe");
        let pipe = self.pipes.pipe(APP_ID, pipe_id).expect("pipe registered");
        let mut received = Vec::new();
        (&*pipe).read_to_end(&mut received).expect("read pipe");
        received
    }

    /// Open pipes held for the scenario's application session.
    pub fn open_pipes(&self) -> usize {
        self.pipes.open_pipes(APP_ID)
    }

    pub fn probe(&self) -> &Probe {
        self.probe.as_ref().expect("probe should be bootstrapped")
    }

    fn probe_mut(&mut self) -> &mut Probe {
        self.probe.as_mut().expect("probe should be bootstrapped")
    }

    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub fn request(&self) -> &ControlRequest {
        self.request.as_ref().expect("a request should have been sent")
    }

    pub fn response(&self) -> &ControlResponse {
        self.response.as_ref().expect("a response should have been received")
    }

    fn collaborators(&self) -> ClusterCollaborators {
        ClusterCollaborators {
            client: self.client.clone(),
            cache: self.cache.clone(),
            pipes: self.pipes.clone(),
        }
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a fresh world for a scenario.
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
