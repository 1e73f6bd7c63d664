//! Domain types for deploy jobs, builds, and rollout targets.
//!
//! These types are plain data: serializable snapshots of the records the
//! orchestrator reads from its surrounding system. Runtime handles (cluster
//! clients, collaborator services) are kept out of them and injected
//! separately, keyed by id.

use serde::{Deserialize, Serialize};

/// Unique identifier for a project.
pub type ProjectId = i64;

/// Unique identifier for a deploy group (target cluster/namespace).
pub type GroupId = i64;

/// Unique identifier for a role within a project.
pub type RoleId = i64;

/// Unique identifier for a build record.
pub type BuildId = i64;

// ── Job descriptor ─────────────────────────────────────────────────

/// Everything a single deploy attempt needs to know about its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployJob {
    /// The deploy record this job executes (used in build labels).
    pub deploy_id: i64,
    /// Commit to deploy.
    pub commit: String,
    pub user: User,
    pub project: Project,
    pub stage: Stage,
}

/// The user who triggered the deploy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// A project and the workload roles it deploys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Roles belonging to this project, enumerated at plan time.
    pub roles: Vec<Role>,
}

/// A deploy stage: the set of deploy groups a rollout fans out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub name: String,
    pub deploy_groups: Vec<DeployGroup>,
}

/// A target cluster/namespace that receives a portion of a rollout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployGroup {
    pub id: GroupId,
    pub name: String,
    pub namespace: String,
}

/// A named workload kind within a project (e.g. web, worker).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    /// Desired replica count, snapshotted into the release at plan time.
    pub replicas: u32,
    /// Stable network entry point for this role. Roles that take no
    /// traffic leave this unset.
    pub service_name: Option<String>,
}

// ── Build ──────────────────────────────────────────────────────────

/// A container build artifact for a commit.
///
/// Created lazily when no existing build matches the commit. Once a build
/// has a `docker_repo_digest` it is immutable and reusable across deploys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    /// Commit this build was produced from.
    pub git_ref: String,
    /// Full image reference including digest, present only after a
    /// successful image build.
    pub docker_repo_digest: Option<String>,
    /// The image-build job, if one was ever started.
    pub build_job: Option<BuildJob>,
    pub creator_id: i64,
    pub project_id: ProjectId,
    pub label: Option<String>,
}

impl Build {
    /// Whether this artifact is ready to deploy.
    pub fn has_digest(&self) -> bool {
        self.docker_repo_digest.is_some()
    }
}

/// The image-build job attached to a build record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: i64,
    pub status: BuildJobStatus,
}

/// Lifecycle of an image-build job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildJobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl BuildJobStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, BuildJobStatus::Pending | BuildJobStatus::Running)
    }

    /// Terminal in any way — the wait loop can stop polling.
    pub fn is_finished(&self) -> bool {
        !self.is_running()
    }
}

impl std::fmt::Display for BuildJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildJobStatus::Pending => "pending",
            BuildJobStatus::Running => "running",
            BuildJobStatus::Succeeded => "succeeded",
            BuildJobStatus::Failed => "failed",
            BuildJobStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
