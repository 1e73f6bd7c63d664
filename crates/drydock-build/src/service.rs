//! The build service collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use drydock_core::{Build, BuildId, BuildJobStatus};

use crate::error::BuildResult;

/// Request to create a build record and start its image-build job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBuild {
    pub git_ref: String,
    pub creator_id: i64,
    pub project_id: i64,
    pub label: String,
}

/// Boundary to the build system.
///
/// Creating a build also starts its image-build job; the resolver then polls
/// `job_status` until the job reports finished and re-reads the record.
#[async_trait]
pub trait BuildService: Send + Sync {
    /// An existing build for this commit, if any.
    async fn find_by_commit(&self, git_ref: &str) -> BuildResult<Option<Build>>;

    /// Create a build record and kick off its image-build job.
    async fn create(&self, build: &NewBuild) -> BuildResult<Build>;

    /// Re-read a build record.
    async fn reload(&self, id: BuildId) -> BuildResult<Build>;

    /// Current status of an image-build job.
    async fn job_status(&self, job_id: i64) -> BuildResult<BuildJobStatus>;
}
