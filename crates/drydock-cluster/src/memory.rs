//! In-memory cluster backend.
//!
//! The reference [`ClusterClient`] implementation: a scriptable cluster that
//! the orchestrator test suites (and local dry runs) drive. Pod state can be
//! set directly or queued as a script of per-poll snapshots, so a timed
//! rollout loop observes a deterministic sequence of cluster states.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::client::{
    ClusterClient, ClusterError, ClusterResult, ServiceOutcome, ServiceSpec, WorkloadManifest,
};
use crate::pod::{Event, Pod, PodQuery};

#[derive(Debug, Default)]
struct ClusterState {
    pods: Vec<Pod>,
    /// Queued snapshots; each `get_pods` shifts the next one in before
    /// answering. The last snapshot sticks once the queue drains.
    pod_script: VecDeque<Vec<Pod>>,
    /// pod name → events, in arrival order.
    events: HashMap<String, Vec<Event>>,
    /// (pod name, previous flag) → log text.
    logs: HashMap<(String, bool), String>,
    /// (namespace, name) of existing services.
    services: HashSet<(String, String)>,
    applied: Vec<WorkloadManifest>,
    pod_queries: usize,
    fail_get_pods: bool,
    fail_apply: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryCluster {
    state: Mutex<ClusterState>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the current pod set.
    pub fn set_pods(&self, pods: Vec<Pod>) {
        self.locked().pods = pods;
    }

    /// Queue a snapshot to become current on a later `get_pods` call.
    pub fn queue_pods(&self, pods: Vec<Pod>) {
        self.locked().pod_script.push_back(pods);
    }

    pub fn push_event(&self, pod_name: &str, event: Event) {
        self.locked()
            .events
            .entry(pod_name.to_string())
            .or_default()
            .push(event);
    }

    pub fn set_log(&self, pod_name: &str, previous: bool, log: &str) {
        self.locked()
            .logs
            .insert((pod_name.to_string(), previous), log.to_string());
    }

    /// Pre-create a service, as if an earlier release had made it.
    pub fn add_service(&self, namespace: &str, name: &str) {
        self.locked()
            .services
            .insert((namespace.to_string(), name.to_string()));
    }

    pub fn has_service(&self, namespace: &str, name: &str) -> bool {
        self.locked()
            .services
            .contains(&(namespace.to_string(), name.to_string()))
    }

    /// Manifests submitted so far, in order.
    pub fn applied(&self) -> Vec<WorkloadManifest> {
        self.locked().applied.clone()
    }

    /// How many `get_pods` calls this cluster has answered.
    pub fn pod_queries(&self) -> usize {
        self.locked().pod_queries
    }

    /// Make subsequent `get_pods` calls fail.
    pub fn fail_get_pods(&self, fail: bool) {
        self.locked().fail_get_pods = fail;
    }

    /// Make subsequent `apply` calls fail.
    pub fn fail_apply(&self, fail: bool) {
        self.locked().fail_apply = fail;
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn get_pods(&self, query: &PodQuery) -> ClusterResult<Vec<Pod>> {
        let mut state = self.locked();
        state.pod_queries += 1;
        if state.fail_get_pods {
            return Err(ClusterError::Api("connection refused".to_string()));
        }
        if let Some(next) = state.pod_script.pop_front() {
            state.pods = next;
        }
        let pods: Vec<Pod> = state
            .pods
            .iter()
            .filter(|p| {
                p.namespace == query.namespace
                    && p.release_id == query.release_id
                    && p.group_id == query.group_id
            })
            .cloned()
            .collect();
        debug!(
            namespace = %query.namespace,
            group = query.group_id,
            count = pods.len(),
            "answered pod query"
        );
        Ok(pods)
    }

    async fn get_events(
        &self,
        _namespace: &str,
        field_selector: &str,
    ) -> ClusterResult<Vec<Event>> {
        let state = self.locked();
        let pod_name = field_selector
            .strip_prefix("involvedObject.name=")
            .ok_or_else(|| {
                ClusterError::Api(format!("unsupported field selector: {field_selector}"))
            })?;
        Ok(state.events.get(pod_name).cloned().unwrap_or_default())
    }

    async fn get_pod_log(
        &self,
        pod_name: &str,
        _namespace: &str,
        previous: bool,
    ) -> ClusterResult<String> {
        self.locked()
            .logs
            .get(&(pod_name.to_string(), previous))
            .cloned()
            .ok_or_else(|| ClusterError::PodNotFound(pod_name.to_string()))
    }

    async fn apply(&self, manifest: &WorkloadManifest) -> ClusterResult<()> {
        let mut state = self.locked();
        if state.fail_apply {
            return Err(ClusterError::Api(format!(
                "apply rejected for {}/{}",
                manifest.namespace, manifest.name
            )));
        }
        debug!(name = %manifest.name, namespace = %manifest.namespace, "manifest applied");
        state.applied.push(manifest.clone());
        Ok(())
    }

    async fn ensure_service(&self, spec: &ServiceSpec) -> ClusterResult<ServiceOutcome> {
        let mut state = self.locked();
        let key = (spec.namespace.clone(), spec.name.clone());
        if state.services.contains(&key) {
            Ok(ServiceOutcome::AlreadyExists)
        } else {
            state.services.insert(key);
            Ok(ServiceOutcome::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::PodPhase;

    fn pod(name: &str, group_id: i64, ready: bool) -> Pod {
        Pod {
            name: name.to_string(),
            namespace: "apps".to_string(),
            release_id: 1,
            group_id,
            role_id: 1,
            phase: PodPhase::Running,
            ready,
            restart_count: 0,
        }
    }

    fn query(group_id: i64) -> PodQuery {
        PodQuery {
            namespace: "apps".to_string(),
            release_id: 1,
            group_id,
        }
    }

    #[tokio::test]
    async fn filters_pods_by_query() {
        let cluster = InMemoryCluster::new();
        cluster.set_pods(vec![pod("a", 1, true), pod("b", 2, true)]);

        let pods = cluster.get_pods(&query(1)).await.unwrap();
        assert_eq!(pods.len(), 1);
        assert_eq!(pods[0].name, "a");
    }

    #[tokio::test]
    async fn scripted_snapshots_shift_per_query() {
        let cluster = InMemoryCluster::new();
        cluster.queue_pods(vec![pod("a", 1, false)]);
        cluster.queue_pods(vec![pod("a", 1, true)]);

        assert!(!cluster.get_pods(&query(1)).await.unwrap()[0].ready);
        assert!(cluster.get_pods(&query(1)).await.unwrap()[0].ready);
        // Script exhausted — the last snapshot sticks.
        assert!(cluster.get_pods(&query(1)).await.unwrap()[0].ready);
        assert_eq!(cluster.pod_queries(), 3);
    }

    #[tokio::test]
    async fn get_pods_failure_injection() {
        let cluster = InMemoryCluster::new();
        cluster.fail_get_pods(true);
        let err = cluster.get_pods(&query(1)).await.unwrap_err();
        assert!(matches!(err, ClusterError::Api(_)));
    }

    #[tokio::test]
    async fn events_scoped_by_field_selector() {
        let cluster = InMemoryCluster::new();
        cluster.push_event(
            "web-1",
            Event {
                reason: "FailedScheduling".to_string(),
                message: "insufficient cpu".to_string(),
            },
        );

        let events = cluster
            .get_events("apps", "involvedObject.name=web-1")
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, "FailedScheduling");

        let none = cluster
            .get_events("apps", "involvedObject.name=other")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn pod_logs_keyed_by_previous_flag() {
        let cluster = InMemoryCluster::new();
        cluster.set_log("web-1", false, "current boot");
        cluster.set_log("web-1", true, "previous crash");

        assert_eq!(
            cluster.get_pod_log("web-1", "apps", true).await.unwrap(),
            "previous crash"
        );
        assert_eq!(
            cluster.get_pod_log("web-1", "apps", false).await.unwrap(),
            "current boot"
        );
        assert!(cluster.get_pod_log("gone", "apps", false).await.is_err());
    }

    #[tokio::test]
    async fn ensure_service_is_idempotent() {
        let cluster = InMemoryCluster::new();
        let spec = ServiceSpec {
            name: "app-web".to_string(),
            namespace: "apps".to_string(),
            role_id: 1,
        };

        assert_eq!(
            cluster.ensure_service(&spec).await.unwrap(),
            ServiceOutcome::Created
        );
        assert_eq!(
            cluster.ensure_service(&spec).await.unwrap(),
            ServiceOutcome::AlreadyExists
        );
        assert!(cluster.has_service("apps", "app-web"));
    }

    #[tokio::test]
    async fn apply_records_and_fails_on_demand() {
        let cluster = InMemoryCluster::new();
        let manifest = WorkloadManifest {
            name: "web".to_string(),
            namespace: "apps".to_string(),
            image: "registry/app@sha256:beef".to_string(),
            replicas: 2,
            selector: crate::client::WorkloadSelector {
                release_id: 1,
                group_id: 1,
                role_id: 1,
            },
        };

        cluster.apply(&manifest).await.unwrap();
        assert_eq!(cluster.applied(), vec![manifest.clone()]);

        cluster.fail_apply(true);
        assert!(cluster.apply(&manifest).await.is_err());
        assert_eq!(cluster.applied().len(), 1);
    }
}
