//! Kubernetes controls.
//!
//! The embedding process supplies three collaborators: a [`ClusterClient`]
//! that talks to the API server, a [`ResourceCache`] holding the resources
//! the probe last observed, and a [`PipeClient`] that carries pipes to remote
//! callers. [`KubernetesControls`] binds the sixteen Kubernetes control
//! identifiers to handlers built on those collaborators.
//!
//! [`PipeClient`]: kubeprobe_controls::PipeClient

mod capture;
mod client;
mod controls;
mod resources;

pub use capture::{
    Capture, CaptureError, ClaimTarget, CronJobs, DaemonSets, Deployments, PersistentVolumeClaims,
    PersistentVolumes, PodTarget, Pods, Services, SnapshotTarget, StatefulSets, StorageClasses,
    VolumeSnapshots, WorkloadTarget, capture, resolve,
};
pub use client::{ClientError, ClusterClient};
pub use controls::KubernetesControls;
pub use resources::{Meta, PersistentVolumeClaim, Pod, ResourceCache, VolumeSnapshot};
