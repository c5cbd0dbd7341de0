//! In-memory resource cache populated by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use kubeprobe_report::ResourceKind;

use crate::kubernetes::{Meta, PersistentVolumeClaim, Pod, ResourceCache, VolumeSnapshot};

struct Record {
    uid: String,
    name: String,
    namespace: String,
}

impl Record {
    fn new(namespace: &str, name: &str, uid: &str) -> Self {
        Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            namespace: namespace.to_owned(),
        }
    }
}

impl Meta for Record {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

macro_rules! delegate_meta {
    ($record:ty) => {
        impl Meta for $record {
            fn uid(&self) -> &str {
                self.meta.uid()
            }

            fn name(&self) -> &str {
                self.meta.name()
            }

            fn namespace(&self) -> &str {
                self.meta.namespace()
            }
        }
    };
}

struct PodRecord {
    meta: Record,
    containers: Vec<String>,
}

delegate_meta!(PodRecord);

impl Pod for PodRecord {
    fn container_names(&self) -> &[String] {
        &self.containers
    }
}

struct ClaimRecord {
    meta: Record,
    capacity: String,
}

delegate_meta!(ClaimRecord);

impl PersistentVolumeClaim for ClaimRecord {
    fn capacity(&self) -> &str {
        &self.capacity
    }
}

struct SnapshotRecord {
    meta: Record,
    volume_name: String,
    capacity: String,
}

delegate_meta!(SnapshotRecord);

impl VolumeSnapshot for SnapshotRecord {
    fn volume_name(&self) -> &str {
        &self.volume_name
    }

    fn capacity(&self) -> &str {
        &self.capacity
    }
}

#[derive(Default)]
struct CacheState {
    pods: Vec<PodRecord>,
    workloads: Vec<(ResourceKind, Record)>,
    claims: Vec<ClaimRecord>,
    snapshots: Vec<SnapshotRecord>,
}

/// Resource cache backed by plain vectors, visited in insertion order.
#[derive(Default)]
pub struct InMemoryCache {
    state: Mutex<CacheState>,
    walks: AtomicUsize,
}

impl InMemoryCache {
    pub fn add_pod(&self, namespace: &str, name: &str, uid: &str, containers: &[&str]) {
        self.state().pods.push(PodRecord {
            meta: Record::new(namespace, name, uid),
            containers: containers.iter().map(|&name| name.to_owned()).collect(),
        });
    }

    pub fn add_workload(&self, kind: ResourceKind, namespace: &str, name: &str, uid: &str) {
        self.state()
            .workloads
            .push((kind, Record::new(namespace, name, uid)));
    }

    pub fn add_claim(&self, namespace: &str, name: &str, uid: &str, capacity: &str) {
        self.state().claims.push(ClaimRecord {
            meta: Record::new(namespace, name, uid),
            capacity: capacity.to_owned(),
        });
    }

    pub fn add_snapshot(
        &self,
        namespace: &str,
        name: &str,
        uid: &str,
        volume_name: &str,
        capacity: &str,
    ) {
        self.state().snapshots.push(SnapshotRecord {
            meta: Record::new(namespace, name, uid),
            volume_name: volume_name.to_owned(),
            capacity: capacity.to_owned(),
        });
    }

    /// Number of walks performed so far, across all kinds.
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().expect("cache mutex poisoned")
    }

    fn walk_kind(&self, kind: ResourceKind, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walks.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        for (_, record) in state.workloads.iter().filter(|(found, _)| *found == kind) {
            visit(record);
        }
    }
}

impl ResourceCache for InMemoryCache {
    fn walk_pods(&self, visit: &mut dyn FnMut(&dyn Pod)) {
        self.walks.fetch_add(1, Ordering::SeqCst);
        for pod in &self.state().pods {
            visit(pod);
        }
    }

    fn walk_deployments(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::Deployment, visit);
    }

    fn walk_services(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::Service, visit);
    }

    fn walk_daemon_sets(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::DaemonSet, visit);
    }

    fn walk_stateful_sets(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::StatefulSet, visit);
    }

    fn walk_cron_jobs(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::CronJob, visit);
    }

    fn walk_persistent_volumes(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::PersistentVolume, visit);
    }

    fn walk_persistent_volume_claims(&self, visit: &mut dyn FnMut(&dyn PersistentVolumeClaim)) {
        self.walks.fetch_add(1, Ordering::SeqCst);
        for claim in &self.state().claims {
            visit(claim);
        }
    }

    fn walk_storage_classes(&self, visit: &mut dyn FnMut(&dyn Meta)) {
        self.walk_kind(ResourceKind::StorageClass, visit);
    }

    fn walk_volume_snapshots(&self, visit: &mut dyn FnMut(&dyn VolumeSnapshot)) {
        self.walks.fetch_add(1, Ordering::SeqCst);
        for snapshot in &self.state().snapshots {
            visit(snapshot);
        }
    }
}
