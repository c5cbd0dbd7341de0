//! Control identifiers understood by the Kubernetes integration.
//!
//! These strings form the wire vocabulary between a remote caller and the
//! probe. They are matched exactly.

/// Clones a volume snapshot into a new claim.
pub const KUBERNETES_CLONE_VOLUME_SNAPSHOT: &str = "kubernetes_clone_volume_snapshot";
/// Takes a snapshot of a persistent volume claim.
pub const KUBERNETES_CREATE_VOLUME_SNAPSHOT: &str = "kubernetes_create_volume_snapshot";
/// Streams the logs of every container in a pod.
pub const KUBERNETES_GET_LOGS: &str = "kubernetes_get_logs";
/// Streams the description of a pod.
pub const KUBERNETES_DESCRIBE_POD: &str = "kubernetes_describe_pod";
/// Streams the description of a service.
pub const KUBERNETES_DESCRIBE_SERVICE: &str = "kubernetes_describe_service";
/// Streams the description of a cron job.
pub const KUBERNETES_DESCRIBE_CRONJOB: &str = "kubernetes_describe_cronjob";
/// Streams the description of a deployment.
pub const KUBERNETES_DESCRIBE_DEPLOYMENT: &str = "kubernetes_describe_deployment";
/// Streams the description of a daemon set.
pub const KUBERNETES_DESCRIBE_DAEMONSET: &str = "kubernetes_describe_daemonset";
/// Streams the description of a persistent volume claim.
pub const KUBERNETES_DESCRIBE_PVC: &str = "kubernetes_describe_pvc";
/// Streams the description of a persistent volume.
pub const KUBERNETES_DESCRIBE_PV: &str = "kubernetes_describe_pv";
/// Streams the description of a storage class.
pub const KUBERNETES_DESCRIBE_STORAGE_CLASS: &str = "kubernetes_describe_storageclass";
/// Streams the description of a stateful set.
pub const KUBERNETES_DESCRIBE_STATEFULSET: &str = "kubernetes_describe_statefulset";
/// Deletes a pod.
pub const KUBERNETES_DELETE_POD: &str = "kubernetes_delete_pod";
/// Deletes a volume snapshot.
pub const KUBERNETES_DELETE_VOLUME_SNAPSHOT: &str = "kubernetes_delete_volume_snapshot";
/// Adds one replica to a deployment.
pub const KUBERNETES_SCALE_UP: &str = "kubernetes_scale_up";
/// Removes one replica from a deployment.
pub const KUBERNETES_SCALE_DOWN: &str = "kubernetes_scale_down";

/// Every control the Kubernetes integration registers.
pub const KUBERNETES_CONTROLS: [&str; 16] = [
    KUBERNETES_CLONE_VOLUME_SNAPSHOT,
    KUBERNETES_CREATE_VOLUME_SNAPSHOT,
    KUBERNETES_GET_LOGS,
    KUBERNETES_DESCRIBE_POD,
    KUBERNETES_DESCRIBE_SERVICE,
    KUBERNETES_DESCRIBE_CRONJOB,
    KUBERNETES_DESCRIBE_DEPLOYMENT,
    KUBERNETES_DESCRIBE_DAEMONSET,
    KUBERNETES_DESCRIBE_PVC,
    KUBERNETES_DESCRIBE_PV,
    KUBERNETES_DESCRIBE_STORAGE_CLASS,
    KUBERNETES_DESCRIBE_STATEFULSET,
    KUBERNETES_DELETE_POD,
    KUBERNETES_DELETE_VOLUME_SNAPSHOT,
    KUBERNETES_SCALE_UP,
    KUBERNETES_SCALE_DOWN,
];
