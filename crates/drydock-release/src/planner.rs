//! Expands a deploy job into a persisted release.
//!
//! The planner snapshots the stage's deploy groups and the project's roles
//! (with their replica counts as configured right now) into a plan, persists
//! it, and logs the full fan-out configuration for auditability.

use std::sync::Arc;

use tracing::info;

use drydock_core::{Build, DeployJob, JobOutput};

use crate::error::ReleaseResult;
use crate::store::ReleaseStore;
use crate::types::{Release, ReleasePlan};

pub struct ReleasePlanner {
    store: Arc<dyn ReleaseStore>,
    output: JobOutput,
}

impl ReleasePlanner {
    pub fn new(store: Arc<dyn ReleaseStore>, output: JobOutput) -> Self {
        Self { store, output }
    }

    /// Build the fan-out snapshot for every (deploy group, role) pair and
    /// persist it. Validation failures are fatal and never retried.
    pub async fn create_release(&self, job: &DeployJob, build: &Build) -> ReleaseResult<Release> {
        let plan = ReleasePlan {
            build_id: build.id,
            docker_repo_digest: build.docker_repo_digest.clone().unwrap_or_default(),
            user_id: job.user.id,
            project_id: job.project.id,
            groups: job.stage.deploy_groups.clone(),
            roles: job.project.roles.clone(),
        };

        let release = self.store.create(&plan).await?;

        self.output.puts(format!(
            "Created release {}\nConfig: {}",
            release.id,
            group_config_summary(&plan)
        ));
        info!(
            release = release.id,
            build = build.id,
            groups = plan.groups.len(),
            roles = plan.roles.len(),
            docs = release.docs.len(),
            "release created"
        );
        Ok(release)
    }
}

/// The per-group fan-out as a compact JSON summary, mirroring what was
/// snapshotted: group ids with role ids and replica counts.
fn group_config_summary(plan: &ReleasePlan) -> String {
    let config: Vec<serde_json::Value> = plan
        .groups
        .iter()
        .map(|group| {
            serde_json::json!({
                "id": group.id,
                "roles": plan
                    .roles
                    .iter()
                    .map(|role| serde_json::json!({"id": role.id, "replicas": role.replicas}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::Value::Array(config).to_string()
}
