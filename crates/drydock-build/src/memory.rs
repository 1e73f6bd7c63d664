//! In-memory build service.
//!
//! Scriptable [`BuildService`] used by the test suites: seeded builds,
//! configurable job countdowns, and a record of every create request.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use drydock_core::{Build, BuildId, BuildJob, BuildJobStatus};

use crate::error::{BuildError, BuildResult};
use crate::service::{BuildService, NewBuild};

#[derive(Debug)]
struct BuildState {
    builds: HashMap<BuildId, Build>,
    created: Vec<NewBuild>,
    next_id: i64,
    /// When set, created builds get no image-build job at all.
    create_without_job: bool,
    /// `job_status` answers Running this many times before finishing.
    job_countdown: u32,
    final_status: BuildJobStatus,
    /// Digest granted to the build when its job succeeds.
    digest_on_success: Option<String>,
}

impl Default for BuildState {
    fn default() -> Self {
        Self {
            builds: HashMap::new(),
            created: Vec::new(),
            next_id: 1,
            create_without_job: false,
            job_countdown: 0,
            final_status: BuildJobStatus::Succeeded,
            digest_on_success: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBuildService {
    state: Mutex<BuildState>,
}

impl InMemoryBuildService {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, BuildState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an existing build for a commit, optionally already carrying a
    /// digest.
    pub fn seed_build(&self, git_ref: &str, digest: Option<&str>) -> Build {
        let mut state = self.locked();
        let id = state.next_id;
        state.next_id += 1;
        let build = Build {
            id,
            git_ref: git_ref.to_string(),
            docker_repo_digest: digest.map(str::to_string),
            build_job: None,
            creator_id: 0,
            project_id: 0,
            label: None,
        };
        state.builds.insert(id, build.clone());
        build
    }

    /// Created builds get no image-build job (the "never ran" case).
    pub fn create_without_job(&self, value: bool) {
        self.locked().create_without_job = value;
    }

    /// Jobs answer Running `countdown` times, then finish with `status`,
    /// granting `digest` on success.
    pub fn finish_jobs_after(
        &self,
        countdown: u32,
        status: BuildJobStatus,
        digest: Option<&str>,
    ) {
        let mut state = self.locked();
        state.job_countdown = countdown;
        state.final_status = status;
        state.digest_on_success = digest.map(str::to_string);
    }

    /// Every create request received so far.
    pub fn created(&self) -> Vec<NewBuild> {
        self.locked().created.clone()
    }
}

#[async_trait]
impl BuildService for InMemoryBuildService {
    async fn find_by_commit(&self, git_ref: &str) -> BuildResult<Option<Build>> {
        let state = self.locked();
        Ok(state
            .builds
            .values()
            .find(|b| b.git_ref == git_ref)
            .cloned())
    }

    async fn create(&self, request: &NewBuild) -> BuildResult<Build> {
        let mut state = self.locked();
        state.created.push(request.clone());
        let id = state.next_id;
        state.next_id += 1;
        let build_job = if state.create_without_job {
            None
        } else {
            Some(BuildJob {
                id,
                status: BuildJobStatus::Running,
            })
        };
        let build = Build {
            id,
            git_ref: request.git_ref.clone(),
            docker_repo_digest: None,
            build_job,
            creator_id: request.creator_id,
            project_id: request.project_id,
            label: Some(request.label.clone()),
        };
        state.builds.insert(id, build.clone());
        Ok(build)
    }

    async fn reload(&self, id: BuildId) -> BuildResult<Build> {
        self.locked()
            .builds
            .get(&id)
            .cloned()
            .ok_or_else(|| BuildError::Service(format!("no build with id {id}")))
    }

    async fn job_status(&self, job_id: i64) -> BuildResult<BuildJobStatus> {
        let mut state = self.locked();
        if state.job_countdown > 0 {
            state.job_countdown -= 1;
            return Ok(BuildJobStatus::Running);
        }
        let final_status = state.final_status;
        let digest = state.digest_on_success.clone();
        let build = state
            .builds
            .values_mut()
            .find(|b| b.build_job.as_ref().is_some_and(|j| j.id == job_id))
            .ok_or_else(|| BuildError::Service(format!("no job with id {job_id}")))?;
        if let Some(job) = build.build_job.as_mut() {
            job.status = final_status;
        }
        if final_status == BuildJobStatus::Succeeded {
            build.docker_repo_digest = digest;
        }
        Ok(final_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_commit_matches_seeded_builds() {
        let service = InMemoryBuildService::new();
        service.seed_build("abc123", Some("registry/app@sha256:beef"));

        let found = service.find_by_commit("abc123").await.unwrap();
        assert!(found.unwrap().has_digest());
        assert!(service.find_by_commit("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn job_countdown_then_success_grants_digest() {
        let service = InMemoryBuildService::new();
        service.finish_jobs_after(2, BuildJobStatus::Succeeded, Some("registry/app@sha256:beef"));

        let build = service
            .create(&NewBuild {
                git_ref: "abc123".to_string(),
                creator_id: 1,
                project_id: 1,
                label: "test".to_string(),
            })
            .await
            .unwrap();
        let job_id = build.build_job.unwrap().id;

        assert_eq!(
            service.job_status(job_id).await.unwrap(),
            BuildJobStatus::Running
        );
        assert_eq!(
            service.job_status(job_id).await.unwrap(),
            BuildJobStatus::Running
        );
        assert_eq!(
            service.job_status(job_id).await.unwrap(),
            BuildJobStatus::Succeeded
        );

        let reloaded = service.reload(build.id).await.unwrap();
        assert!(reloaded.has_digest());
    }
}
