//! Release plan types.
//!
//! A `Release` and its docs are created once per deploy attempt and never
//! mutated afterwards; the monitor and diagnostics only read them.

use serde::{Deserialize, Serialize};

use drydock_cluster::{PodQuery, ServiceSpec, WorkloadManifest, WorkloadSelector};
use drydock_core::{BuildId, DeployGroup, ProjectId, Role};

/// Unique identifier for a release.
pub type ReleaseId = i64;

/// What the planner hands to the store: the full fan-out snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub build_id: BuildId,
    /// Image reference including digest, from the resolved build.
    pub docker_repo_digest: String,
    pub user_id: i64,
    pub project_id: ProjectId,
    /// Deploy groups of the stage, at plan time.
    pub groups: Vec<DeployGroup>,
    /// Roles of the project with their replica counts, at plan time.
    pub roles: Vec<Role>,
}

/// One immutable rollout plan spanning all deploy groups and roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub build_id: BuildId,
    pub docker_repo_digest: String,
    pub user_id: i64,
    pub project_id: ProjectId,
    /// One doc per (deploy group, role) pair; `docs.len()` is always
    /// `groups × roles` and never changes after creation.
    pub docs: Vec<ReleaseDoc>,
}

/// The per (deploy group, role) unit of the release plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDoc {
    pub release_id: ReleaseId,
    pub group: DeployGroup,
    /// Role snapshot, including the replica count captured at plan time.
    pub role: Role,
}

impl Release {
    /// The distinct deploy groups this release fans out to, in doc order.
    pub fn deploy_groups(&self) -> Vec<&DeployGroup> {
        let mut groups: Vec<&DeployGroup> = Vec::new();
        for doc in &self.docs {
            if !groups.iter().any(|g| g.id == doc.group.id) {
                groups.push(&doc.group);
            }
        }
        groups
    }

    /// Selector for this release's pods within one deploy group.
    pub fn pod_query(&self, group: &DeployGroup) -> PodQuery {
        PodQuery {
            namespace: group.namespace.clone(),
            release_id: self.id,
            group_id: group.id,
        }
    }

    /// The workload manifest for one doc.
    pub fn manifest_for(&self, doc: &ReleaseDoc) -> WorkloadManifest {
        WorkloadManifest {
            name: format!("{}-r{}", doc.role.name, self.id),
            namespace: doc.group.namespace.clone(),
            image: self.docker_repo_digest.clone(),
            replicas: doc.role.replicas,
            selector: WorkloadSelector {
                release_id: self.id,
                group_id: doc.group.id,
                role_id: doc.role.id,
            },
        }
    }
}

impl ReleaseDoc {
    /// The service spec for this doc's role, or `None` when the role
    /// defines no service.
    pub fn service_spec(&self) -> Option<ServiceSpec> {
        self.role.service_name.as_ref().map(|name| ServiceSpec {
            name: name.clone(),
            namespace: self.group.namespace.clone(),
            role_id: self.role.id,
        })
    }
}
