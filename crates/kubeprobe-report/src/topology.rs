//! Resource kinds surfaced in the Kubernetes topology.
//!
//! Every kind carries three spellings: the tag embedded in node identifiers,
//! the human label used in operator-facing messages, and the API group/kind
//! pair handed to the cluster client when describing a resource.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kubernetes resource kinds that the probe can target with controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A pod.
    Pod,
    /// A deployment.
    Deployment,
    /// A service.
    Service,
    /// A daemon set.
    DaemonSet,
    /// A stateful set.
    StatefulSet,
    /// A cron job.
    CronJob,
    /// A cluster-scoped persistent volume.
    PersistentVolume,
    /// A persistent volume claim.
    PersistentVolumeClaim,
    /// A cluster-scoped storage class.
    StorageClass,
    /// A volume snapshot.
    VolumeSnapshot,
}

impl ResourceKind {
    /// Every kind, in a fixed order.
    pub const ALL: [Self; 10] = [
        Self::Pod,
        Self::Deployment,
        Self::Service,
        Self::DaemonSet,
        Self::StatefulSet,
        Self::CronJob,
        Self::PersistentVolume,
        Self::PersistentVolumeClaim,
        Self::StorageClass,
        Self::VolumeSnapshot,
    ];

    /// Returns the tag embedded in node identifiers for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Deployment => "deployment",
            Self::Service => "service",
            Self::DaemonSet => "daemonset",
            Self::StatefulSet => "statefulset",
            Self::CronJob => "cronjob",
            Self::PersistentVolume => "persistent_volume",
            Self::PersistentVolumeClaim => "persistent_volume_claim",
            Self::StorageClass => "storage_class",
            Self::VolumeSnapshot => "volume_snapshot",
        }
    }

    /// Returns the label used in operator-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::Service => "Service",
            Self::DaemonSet => "Daemon Set",
            Self::StatefulSet => "Stateful Set",
            Self::CronJob => "Cron Job",
            Self::PersistentVolume => "Persistent volume",
            Self::PersistentVolumeClaim => "Persistent volume claim",
            Self::StorageClass => "StorageClass",
            Self::VolumeSnapshot => "Volume snapshot",
        }
    }

    /// Returns the API group and kind used when describing a resource.
    #[must_use]
    pub const fn group_kind(self) -> GroupKind {
        match self {
            Self::Pod => GroupKind::new("", "Pod"),
            Self::Deployment => GroupKind::new("apps", "Deployment"),
            Self::Service => GroupKind::new("", "Service"),
            Self::DaemonSet => GroupKind::new("apps", "DaemonSet"),
            Self::StatefulSet => GroupKind::new("apps", "StatefulSet"),
            Self::CronJob => GroupKind::new("batch", "CronJob"),
            Self::PersistentVolume => GroupKind::new("", "PersistentVolume"),
            Self::PersistentVolumeClaim => GroupKind::new("", "PersistentVolumeClaim"),
            Self::StorageClass => GroupKind::new("storage.k8s.io", "StorageClass"),
            Self::VolumeSnapshot => {
                GroupKind::new("volumesnapshot.external-storage.k8s.io", "VolumeSnapshot")
            }
        }
    }

    /// Returns `false` for cluster-scoped kinds, which carry no namespace.
    #[must_use]
    pub const fn is_namespaced(self) -> bool {
        !matches!(self, Self::PersistentVolume | Self::StorageClass)
    }

    /// Looks up a kind by its node identifier tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.tag())
    }
}

/// Error returned when parsing a resource kind fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported resource kind: {0}")]
pub struct ResourceKindParseError(String);

impl ResourceKindParseError {
    /// Returns the offending value that could not be parsed.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceKindParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::from_tag(&normalised).ok_or(ResourceKindParseError(normalised))
    }
}

/// API group and kind pair identifying a resource type to the cluster API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupKind {
    group: &'static str,
    kind: &'static str,
}

impl GroupKind {
    const fn new(group: &'static str, kind: &'static str) -> Self {
        Self { group, kind }
    }

    /// Returns the API group; empty for the core group.
    #[must_use]
    pub const fn group(&self) -> &'static str {
        self.group
    }

    /// Returns the kind name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            formatter.write_str(self.kind)
        } else {
            write!(formatter, "{}.{}", self.kind, self.group)
        }
    }
}
