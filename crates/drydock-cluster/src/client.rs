//! The cluster capability trait and the specs it accepts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pod::{Event, Pod, PodQuery};

/// One client per deploy group, keyed by group id.
pub type ClusterRegistry = HashMap<i64, Arc<dyn ClusterClient>>;

/// Errors from a cluster backend.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster API request failed: {0}")]
    Api(String),

    #[error("pod not found: {0}")]
    PodNotFound(String),
}

pub type ClusterResult<T> = Result<T, ClusterError>;

/// Labels that tie a workload's pods back to their release plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSelector {
    pub release_id: i64,
    pub group_id: i64,
    pub role_id: i64,
}

/// One role's workload in one deploy group, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadManifest {
    /// Workload name, unique within the namespace.
    pub name: String,
    pub namespace: String,
    /// Image reference including digest.
    pub image: String,
    pub replicas: u32,
    pub selector: WorkloadSelector,
}

/// A role's stable network entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub namespace: String,
    pub role_id: i64,
}

/// What `ensure_service` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The service did not exist and was created.
    Created,
    /// A service with this identity already exists; it was left untouched.
    AlreadyExists,
}

/// Capability set of one target cluster.
///
/// One implementation per cluster backend, injected per deploy group. All
/// operations are independent; the orchestrator may issue `get_pods` against
/// several clusters concurrently.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Current pods matching the release/group selector.
    async fn get_pods(&self, query: &PodQuery) -> ClusterResult<Vec<Pod>>;

    /// Events in a namespace, scoped by a field selector such as
    /// `involvedObject.name=<pod>`.
    async fn get_events(
        &self,
        namespace: &str,
        field_selector: &str,
    ) -> ClusterResult<Vec<Event>>;

    /// Container logs for a pod. With `previous` set, the logs of the
    /// previous container instance (what a crash-looping pod printed before
    /// its last restart).
    async fn get_pod_log(
        &self,
        pod_name: &str,
        namespace: &str,
        previous: bool,
    ) -> ClusterResult<String>;

    /// Submit a workload manifest.
    async fn apply(&self, manifest: &WorkloadManifest) -> ClusterResult<()>;

    /// Create the service if absent. Never recreates or mutates an existing
    /// service's identity.
    async fn ensure_service(&self, spec: &ServiceSpec) -> ClusterResult<ServiceOutcome>;
}
