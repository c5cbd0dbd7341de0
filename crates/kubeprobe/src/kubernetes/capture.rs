//! Resolve-then-invoke over the resource cache.
//!
//! Every control addresses a topology node. Before the control runs, the node
//! identifier is decoded for the control's resource kind, the cache is walked
//! for a resource with that uid, and the attributes the control needs are
//! copied into a target value. Only then is the control body invoked.
//!
//! The algorithm is written once in [`resolve`] and [`capture`]; each resource
//! kind contributes a [`Capture`] marker that knows which cache walk to use
//! and which attributes to copy.

use kubeprobe_report::{ControlRequest, ControlResponse, NodeId, NodeIdError, ResourceKind};
use thiserror::Error;
use tracing::debug;

use super::resources::{Meta, PersistentVolumeClaim, Pod, ResourceCache, VolumeSnapshot};
use crate::KUBERNETES_TARGET;

/// Resource kind that controls can be captured against.
///
/// Markers are unit types, so the trait requires `'static`.
pub trait Capture: 'static {
    /// Kind encoded in node identifiers for this marker.
    const KIND: ResourceKind;

    /// Cached handle visited by the walk.
    type Handle<'a>: Meta + ?Sized + 'a;

    /// Attributes copied out of a matching handle.
    type Target;

    /// Visits every cached resource of this kind.
    fn walk(cache: &dyn ResourceCache, visit: &mut dyn for<'a> FnMut(&'a Self::Handle<'a>));

    /// Copies the attributes a control needs out of `handle`.
    fn target(handle: &Self::Handle<'_>) -> Self::Target;
}

/// Reasons a node identifier does not resolve to a cached resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The identifier is malformed or names another kind.
    #[error("Invalid ID: {node_id}")]
    InvalidId {
        /// Identifier as received.
        node_id: String,
        /// Decoding failure.
        #[source]
        source: NodeIdError,
    },
    /// No cached resource of the kind carries the uid.
    #[error("{} not found: {uid}", .kind.label())]
    NotFound {
        /// Kind that was searched.
        kind: ResourceKind,
        /// Uid decoded from the identifier.
        uid: String,
    },
}

impl CaptureError {
    fn invalid_id(node_id: &str, source: NodeIdError) -> Self {
        Self::InvalidId {
            node_id: node_id.to_owned(),
            source,
        }
    }

    fn not_found(kind: ResourceKind, uid: &str) -> Self {
        Self::NotFound {
            kind,
            uid: uid.to_owned(),
        }
    }

    /// Converts the failure into the response sent to the caller.
    #[must_use]
    pub fn into_response(self) -> ControlResponse {
        ControlResponse::error(self)
    }
}

/// Resolves `node_id` to the target of the cached resource it names.
///
/// When several cached resources share the uid, the last one visited wins.
///
/// # Errors
///
/// Returns [`CaptureError::InvalidId`] when the identifier does not decode as
/// `K::KIND`, in which case the cache is not consulted, and
/// [`CaptureError::NotFound`] when no cached resource matches.
pub fn resolve<K: Capture>(
    cache: &dyn ResourceCache,
    node_id: &str,
) -> Result<K::Target, CaptureError> {
    let id = NodeId::decode_as(K::KIND, node_id)
        .map_err(|source| CaptureError::invalid_id(node_id, source))?;

    let mut found = None;
    K::walk(cache, &mut |handle| {
        if handle.uid() == id.uid() {
            found = Some(K::target(handle));
        }
    });
    found.ok_or_else(|| CaptureError::not_found(K::KIND, id.uid()))
}

/// Resolves the request's node and runs `body` against it.
///
/// `body` only runs when resolution succeeds; its response is returned
/// unchanged. Resolution failures become an error response.
pub fn capture<K, F>(cache: &dyn ResourceCache, request: &ControlRequest, body: F) -> ControlResponse
where
    K: Capture,
    F: FnOnce(&ControlRequest, K::Target) -> ControlResponse,
{
    match resolve::<K>(cache, request.node_id()) {
        Ok(target) => body(request, target),
        Err(error) => {
            debug!(
                target: KUBERNETES_TARGET,
                control = request.control(),
                node = request.node_id(),
                %error,
                "control target did not resolve"
            );
            error.into_response()
        }
    }
}

/// Attributes of a resolved pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodTarget {
    /// Pod namespace.
    pub namespace: String,
    /// Pod name.
    pub name: String,
    /// Container names, in spec order.
    pub container_names: Vec<String>,
}

/// Attributes of a resolved workload or cluster-scoped resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadTarget {
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Namespace; `None` for cluster-scoped kinds.
    pub namespace: Option<String>,
    /// Resource name.
    pub name: String,
}

impl WorkloadTarget {
    fn from_handle(kind: ResourceKind, handle: &dyn Meta) -> Self {
        Self {
            kind,
            namespace: kind
                .is_namespaced()
                .then(|| handle.namespace().to_owned()),
            name: handle.name().to_owned(),
        }
    }
}

/// Attributes of a resolved persistent volume claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTarget {
    /// Claim namespace.
    pub namespace: String,
    /// Claim name.
    pub name: String,
    /// Requested storage.
    pub capacity: String,
}

/// Attributes of a resolved volume snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    /// Snapshot namespace.
    pub namespace: String,
    /// Snapshot name.
    pub name: String,
    /// Source persistent volume.
    pub volume_name: String,
    /// Restore size.
    pub capacity: String,
}

/// Capture marker for pods.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pods;

impl Capture for Pods {
    const KIND: ResourceKind = ResourceKind::Pod;
    type Handle<'a> = dyn Pod + 'a;
    type Target = PodTarget;

    fn walk(cache: &dyn ResourceCache, visit: &mut dyn for<'a> FnMut(&'a Self::Handle<'a>)) {
        cache.walk_pods(visit);
    }

    fn target(handle: &Self::Handle<'_>) -> PodTarget {
        PodTarget {
            namespace: handle.namespace().to_owned(),
            name: handle.name().to_owned(),
            container_names: handle.container_names().to_vec(),
        }
    }
}

/// Capture marker for persistent volume claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistentVolumeClaims;

impl Capture for PersistentVolumeClaims {
    const KIND: ResourceKind = ResourceKind::PersistentVolumeClaim;
    type Handle<'a> = dyn PersistentVolumeClaim + 'a;
    type Target = ClaimTarget;

    fn walk(cache: &dyn ResourceCache, visit: &mut dyn for<'a> FnMut(&'a Self::Handle<'a>)) {
        cache.walk_persistent_volume_claims(visit);
    }

    fn target(handle: &Self::Handle<'_>) -> ClaimTarget {
        ClaimTarget {
            namespace: handle.namespace().to_owned(),
            name: handle.name().to_owned(),
            capacity: handle.capacity().to_owned(),
        }
    }
}

/// Capture marker for volume snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeSnapshots;

impl Capture for VolumeSnapshots {
    const KIND: ResourceKind = ResourceKind::VolumeSnapshot;
    type Handle<'a> = dyn VolumeSnapshot + 'a;
    type Target = SnapshotTarget;

    fn walk(cache: &dyn ResourceCache, visit: &mut dyn for<'a> FnMut(&'a Self::Handle<'a>)) {
        cache.walk_volume_snapshots(visit);
    }

    fn target(handle: &Self::Handle<'_>) -> SnapshotTarget {
        SnapshotTarget {
            namespace: handle.namespace().to_owned(),
            name: handle.name().to_owned(),
            volume_name: handle.volume_name().to_owned(),
            capacity: handle.capacity().to_owned(),
        }
    }
}

macro_rules! workload_capture {
    ($(#[$doc:meta])* $marker:ident => $kind:ident, $walk:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marker;

        impl Capture for $marker {
            const KIND: ResourceKind = ResourceKind::$kind;
            type Handle<'a> = dyn Meta + 'a;
            type Target = WorkloadTarget;

            fn walk(
                cache: &dyn ResourceCache,
                visit: &mut dyn for<'a> FnMut(&'a Self::Handle<'a>),
            ) {
                cache.$walk(visit);
            }

            fn target(handle: &Self::Handle<'_>) -> WorkloadTarget {
                WorkloadTarget::from_handle(Self::KIND, handle)
            }
        }
    };
}

workload_capture!(
    /// Capture marker for deployments.
    Deployments => Deployment, walk_deployments
);
workload_capture!(
    /// Capture marker for services.
    Services => Service, walk_services
);
workload_capture!(
    /// Capture marker for daemon sets.
    DaemonSets => DaemonSet, walk_daemon_sets
);
workload_capture!(
    /// Capture marker for stateful sets.
    StatefulSets => StatefulSet, walk_stateful_sets
);
workload_capture!(
    /// Capture marker for cron jobs.
    CronJobs => CronJob, walk_cron_jobs
);
workload_capture!(
    /// Capture marker for persistent volumes.
    PersistentVolumes => PersistentVolume, walk_persistent_volumes
);
workload_capture!(
    /// Capture marker for storage classes.
    StorageClasses => StorageClass, walk_storage_classes
);
