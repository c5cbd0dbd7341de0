//! Read-only views over the probe's resource cache.
//!
//! The cache is owned and refreshed elsewhere. Controls only ever borrow a
//! handle for the duration of a walk and copy out the attributes they need.

/// Attributes shared by every cached resource.
pub trait Meta {
    /// Unique id assigned by the API server.
    fn uid(&self) -> &str;

    /// Resource name.
    fn name(&self) -> &str;

    /// Namespace, empty for cluster-scoped resources.
    fn namespace(&self) -> &str;
}

/// A cached pod.
pub trait Pod: Meta {
    /// Names of the pod's containers, in spec order.
    fn container_names(&self) -> &[String];
}

/// A cached persistent volume claim.
pub trait PersistentVolumeClaim: Meta {
    /// Requested storage, as a Kubernetes quantity (`5Gi`).
    fn capacity(&self) -> &str;
}

/// A cached volume snapshot.
pub trait VolumeSnapshot: Meta {
    /// Name of the persistent volume the snapshot was taken from.
    fn volume_name(&self) -> &str;

    /// Restore size, as a Kubernetes quantity.
    fn capacity(&self) -> &str;
}

/// Per-kind iteration over the currently cached resources.
///
/// Each walk visits every resource of one kind exactly once, in an order the
/// cache chooses. Handles must not be retained after `visit` returns.
pub trait ResourceCache: Send + Sync {
    /// Visits every pod.
    fn walk_pods(&self, visit: &mut dyn FnMut(&dyn Pod));

    /// Visits every deployment.
    fn walk_deployments(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every service.
    fn walk_services(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every daemon set.
    fn walk_daemon_sets(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every stateful set.
    fn walk_stateful_sets(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every cron job.
    fn walk_cron_jobs(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every persistent volume.
    fn walk_persistent_volumes(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every persistent volume claim.
    fn walk_persistent_volume_claims(&self, visit: &mut dyn FnMut(&dyn PersistentVolumeClaim));

    /// Visits every storage class.
    fn walk_storage_classes(&self, visit: &mut dyn FnMut(&dyn Meta));

    /// Visits every volume snapshot.
    fn walk_volume_snapshots(&self, visit: &mut dyn FnMut(&dyn VolumeSnapshot));
}
