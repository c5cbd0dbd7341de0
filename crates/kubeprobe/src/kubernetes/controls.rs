//! Handlers for the Kubernetes control identifiers.

use std::fmt;
use std::sync::Arc;

use kubeprobe_controls::{ControlHandler, HandlerRegistry, PipeClient, ReadCloser, bridge_stream};
use kubeprobe_report::controls::{
    KUBERNETES_CLONE_VOLUME_SNAPSHOT, KUBERNETES_CONTROLS, KUBERNETES_CREATE_VOLUME_SNAPSHOT,
    KUBERNETES_DELETE_POD, KUBERNETES_DELETE_VOLUME_SNAPSHOT, KUBERNETES_DESCRIBE_CRONJOB,
    KUBERNETES_DESCRIBE_DAEMONSET, KUBERNETES_DESCRIBE_DEPLOYMENT, KUBERNETES_DESCRIBE_POD,
    KUBERNETES_DESCRIBE_PV, KUBERNETES_DESCRIBE_PVC, KUBERNETES_DESCRIBE_SERVICE,
    KUBERNETES_DESCRIBE_STATEFULSET, KUBERNETES_DESCRIBE_STORAGE_CLASS, KUBERNETES_GET_LOGS,
    KUBERNETES_SCALE_DOWN, KUBERNETES_SCALE_UP,
};
use kubeprobe_report::{ControlRequest, ControlResponse, ResourceKind};
use tracing::{debug, warn};

use super::capture::{
    Capture, ClaimTarget, CronJobs, DaemonSets, Deployments, PersistentVolumeClaims,
    PersistentVolumes, PodTarget, Pods, Services, SnapshotTarget, StatefulSets, StorageClasses,
    VolumeSnapshots, WorkloadTarget, capture,
};
use super::client::{ClientError, ClusterClient};
use super::resources::ResourceCache;
use crate::KUBERNETES_TARGET;

type Body<T> = fn(&KubernetesControls, &ControlRequest, &T) -> ControlResponse;

/// Kubernetes control handler set.
///
/// Handlers hold a reference to the set, so the set lives as long as any
/// registry it is bound to.
pub struct KubernetesControls {
    client: Arc<dyn ClusterClient>,
    cache: Arc<dyn ResourceCache>,
    pipes: Arc<dyn PipeClient>,
}

impl KubernetesControls {
    /// Builds the handler set over its collaborators.
    #[must_use]
    pub fn new(
        client: Arc<dyn ClusterClient>,
        cache: Arc<dyn ResourceCache>,
        pipes: Arc<dyn PipeClient>,
    ) -> Self {
        Self {
            client,
            cache,
            pipes,
        }
    }

    /// Binds every Kubernetes control in one batch.
    pub fn register(self: &Arc<Self>, registry: &HandlerRegistry) {
        registry.batch(&[], self.handlers());
    }

    /// Unbinds every Kubernetes control in one batch.
    ///
    /// Controls bound by other integrations are left in place.
    pub fn deregister(&self, registry: &HandlerRegistry) {
        registry.batch(&KUBERNETES_CONTROLS, []);
    }

    fn handlers(self: &Arc<Self>) -> Vec<(String, ControlHandler)> {
        vec![
            self.bind::<VolumeSnapshots>(
                KUBERNETES_CLONE_VOLUME_SNAPSHOT,
                Self::clone_volume_snapshot,
            ),
            self.bind::<PersistentVolumeClaims>(
                KUBERNETES_CREATE_VOLUME_SNAPSHOT,
                Self::create_volume_snapshot,
            ),
            self.bind::<Pods>(KUBERNETES_GET_LOGS, Self::get_logs),
            self.bind::<Pods>(KUBERNETES_DESCRIBE_POD, Self::describe_pod),
            self.bind::<Services>(KUBERNETES_DESCRIBE_SERVICE, Self::describe_workload),
            self.bind::<CronJobs>(KUBERNETES_DESCRIBE_CRONJOB, Self::describe_workload),
            self.bind::<Deployments>(KUBERNETES_DESCRIBE_DEPLOYMENT, Self::describe_workload),
            self.bind::<DaemonSets>(KUBERNETES_DESCRIBE_DAEMONSET, Self::describe_workload),
            self.bind::<PersistentVolumeClaims>(KUBERNETES_DESCRIBE_PVC, Self::describe_claim),
            self.bind::<PersistentVolumes>(KUBERNETES_DESCRIBE_PV, Self::describe_workload),
            self.bind::<StorageClasses>(
                KUBERNETES_DESCRIBE_STORAGE_CLASS,
                Self::describe_workload,
            ),
            self.bind::<StatefulSets>(KUBERNETES_DESCRIBE_STATEFULSET, Self::describe_workload),
            self.bind::<Pods>(KUBERNETES_DELETE_POD, Self::delete_pod),
            self.bind::<VolumeSnapshots>(
                KUBERNETES_DELETE_VOLUME_SNAPSHOT,
                Self::delete_volume_snapshot,
            ),
            self.bind::<Deployments>(KUBERNETES_SCALE_UP, Self::scale_up),
            self.bind::<Deployments>(KUBERNETES_SCALE_DOWN, Self::scale_down),
        ]
    }

    fn bind<K>(self: &Arc<Self>, control: &str, body: Body<K::Target>) -> (String, ControlHandler)
    where
        K: Capture,
    {
        let controls = Arc::clone(self);
        let handler: ControlHandler = Arc::new(move |request: &ControlRequest| {
            capture::<K, _>(controls.cache.as_ref(), request, |request, target| {
                body(&controls, request, &target)
            })
        });
        (control.to_owned(), handler)
    }

    fn get_logs(&self, request: &ControlRequest, pod: &PodTarget) -> ControlResponse {
        match self
            .client
            .get_logs(&pod.namespace, &pod.name, &pod.container_names)
        {
            Ok(stream) => self.open_pipe(request, stream),
            Err(error) => client_failure(request, &error),
        }
    }

    fn describe_pod(&self, request: &ControlRequest, pod: &PodTarget) -> ControlResponse {
        let group_kind = ResourceKind::Pod.group_kind();
        match self.client.describe(&pod.namespace, &pod.name, group_kind) {
            Ok(stream) => self.open_pipe(request, stream),
            Err(error) => client_failure(request, &error),
        }
    }

    fn describe_workload(
        &self,
        request: &ControlRequest,
        workload: &WorkloadTarget,
    ) -> ControlResponse {
        let namespace = workload.namespace.as_deref().unwrap_or_default();
        match self
            .client
            .describe(namespace, &workload.name, workload.kind.group_kind())
        {
            Ok(stream) => self.open_pipe(request, stream),
            Err(error) => client_failure(request, &error),
        }
    }

    fn describe_claim(&self, request: &ControlRequest, claim: &ClaimTarget) -> ControlResponse {
        let group_kind = ResourceKind::PersistentVolumeClaim.group_kind();
        match self
            .client
            .describe(&claim.namespace, &claim.name, group_kind)
        {
            Ok(stream) => self.open_pipe(request, stream),
            Err(error) => client_failure(request, &error),
        }
    }

    fn delete_pod(&self, request: &ControlRequest, pod: &PodTarget) -> ControlResponse {
        match self.client.delete_pod(&pod.namespace, &pod.name) {
            Ok(()) => removed(request),
            Err(error) => client_failure(request, &error),
        }
    }

    fn delete_volume_snapshot(
        &self,
        request: &ControlRequest,
        snapshot: &SnapshotTarget,
    ) -> ControlResponse {
        match self
            .client
            .delete_volume_snapshot(&snapshot.namespace, &snapshot.name)
        {
            Ok(()) => removed(request),
            Err(error) => client_failure(request, &error),
        }
    }

    fn create_volume_snapshot(
        &self,
        request: &ControlRequest,
        claim: &ClaimTarget,
    ) -> ControlResponse {
        match self
            .client
            .create_volume_snapshot(&claim.namespace, &claim.name, &claim.capacity)
        {
            Ok(()) => acknowledged(request),
            Err(error) => client_failure(request, &error),
        }
    }

    fn clone_volume_snapshot(
        &self,
        request: &ControlRequest,
        snapshot: &SnapshotTarget,
    ) -> ControlResponse {
        match self.client.clone_volume_snapshot(
            &snapshot.namespace,
            &snapshot.name,
            &snapshot.volume_name,
            &snapshot.capacity,
        ) {
            Ok(()) => acknowledged(request),
            Err(error) => client_failure(request, &error),
        }
    }

    fn scale_up(&self, request: &ControlRequest, workload: &WorkloadTarget) -> ControlResponse {
        let namespace = workload.namespace.as_deref().unwrap_or_default();
        match self.client.scale_up(workload.kind, namespace, &workload.name) {
            Ok(()) => ControlResponse::Empty,
            Err(error) => client_failure(request, &error),
        }
    }

    fn scale_down(&self, request: &ControlRequest, workload: &WorkloadTarget) -> ControlResponse {
        let namespace = workload.namespace.as_deref().unwrap_or_default();
        match self
            .client
            .scale_down(workload.kind, namespace, &workload.name)
        {
            Ok(()) => ControlResponse::Empty,
            Err(error) => client_failure(request, &error),
        }
    }

    fn open_pipe(&self, request: &ControlRequest, stream: Box<dyn ReadCloser>) -> ControlResponse {
        match bridge_stream(stream, self.pipes.as_ref(), request.app_id()) {
            Ok(pipe_id) => {
                debug!(
                    target: KUBERNETES_TARGET,
                    control = request.control(),
                    app = request.app_id(),
                    pipe = %pipe_id,
                    "stream exposed as pipe"
                );
                ControlResponse::Pipe(pipe_id)
            }
            Err(error) => ControlResponse::error(error),
        }
    }
}

impl fmt::Debug for KubernetesControls {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("KubernetesControls")
            .finish_non_exhaustive()
    }
}

fn removed(request: &ControlRequest) -> ControlResponse {
    ControlResponse::RemovedNode(request.node_id().to_owned())
}

fn acknowledged(request: &ControlRequest) -> ControlResponse {
    ControlResponse::Value(request.control().to_owned())
}

fn client_failure(request: &ControlRequest, error: &ClientError) -> ControlResponse {
    warn!(
        target: KUBERNETES_TARGET,
        control = request.control(),
        node = request.node_id(),
        error = %error,
        "cluster client call failed"
    );
    ControlResponse::Error(error.message().to_owned())
}
