//! Cluster management client seam.

use std::error::Error as StdError;

use kubeprobe_controls::ReadCloser;
use kubeprobe_report::{GroupKind, ResourceKind};
use thiserror::Error;

/// Failure reported by the cluster client.
///
/// The message is forwarded to the remote caller verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
    /// Optional source error reported by the client implementation.
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ClientError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Actions the probe performs against the cluster API.
///
/// Implementations own timeouts and retries. Every call is made at most once
/// per control request.
pub trait ClusterClient: Send + Sync {
    /// Deletes a pod.
    fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), ClientError>;

    /// Scales a workload up by one replica.
    fn scale_up(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<(), ClientError>;

    /// Scales a workload down by one replica.
    fn scale_down(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), ClientError>;

    /// Snapshots the volume bound to a persistent volume claim.
    fn create_volume_snapshot(
        &self,
        namespace: &str,
        claim: &str,
        capacity: &str,
    ) -> Result<(), ClientError>;

    /// Deletes a volume snapshot.
    fn delete_volume_snapshot(&self, namespace: &str, name: &str) -> Result<(), ClientError>;

    /// Restores a volume snapshot into a new persistent volume claim.
    fn clone_volume_snapshot(
        &self,
        namespace: &str,
        snapshot: &str,
        volume_name: &str,
        capacity: &str,
    ) -> Result<(), ClientError>;

    /// Opens a stream over the logs of the named containers.
    fn get_logs(
        &self,
        namespace: &str,
        pod: &str,
        containers: &[String],
    ) -> Result<Box<dyn ReadCloser>, ClientError>;

    /// Opens a stream over a human-readable description of a resource.
    ///
    /// `namespace` is empty for cluster-scoped kinds.
    fn describe(
        &self,
        namespace: &str,
        name: &str,
        group_kind: GroupKind,
    ) -> Result<Box<dyn ReadCloser>, ClientError>;
}
