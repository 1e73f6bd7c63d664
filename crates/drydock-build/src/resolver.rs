//! Find-or-create build resolution with a polled wait loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use drydock_core::{Build, DeployJob, JobOutput, StopSignal};

use crate::error::{BuildError, BuildResult};
use crate::service::{BuildService, NewBuild};

/// Obtains a deployable build for a job's commit.
pub struct BuildResolver {
    service: Arc<dyn BuildService>,
    output: JobOutput,
    stop: StopSignal,
    poll_interval: Duration,
}

impl BuildResolver {
    pub fn new(
        service: Arc<dyn BuildService>,
        output: JobOutput,
        stop: StopSignal,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            output,
            stop,
            poll_interval,
        }
    }

    /// Resolve a build for the job's commit.
    ///
    /// Reuses an existing build when one matches, creates one otherwise,
    /// waits for its image-build job, then re-reads the record and judges
    /// it. If the rollout was cancelled mid-wait the build is returned
    /// unjudged — the executor observes the stop signal right after.
    pub async fn resolve(&self, job: &DeployJob) -> BuildResult<Build> {
        let build = match self.service.find_by_commit(&job.commit).await? {
            Some(build) => build,
            None => self.create_build(job).await?,
        };
        let build = self.wait_for_build(build).await?;
        if self.stop.is_stopped() {
            return Ok(build);
        }
        self.ensure_successful(build)
    }

    async fn create_build(&self, job: &DeployJob) -> BuildResult<Build> {
        self.output.puts(format!("Creating Build for {}.", job.commit));
        info!(commit = %job.commit, project = %job.project.name, "creating build");
        self.service
            .create(&NewBuild {
                git_ref: job.commit.clone(),
                creator_id: job.user.id,
                project_id: job.project.id,
                label: format!("Automated build triggered via Deploy #{}", job.deploy_id),
            })
            .await
    }

    /// Block until the image-build job finishes or the rollout is cancelled,
    /// then re-read the build record.
    async fn wait_for_build(&self, build: Build) -> BuildResult<Build> {
        let running_job = build
            .build_job
            .as_ref()
            .filter(|job| job.status.is_running());

        if !build.has_digest() {
            if let Some(job) = running_job {
                self.output
                    .puts(format!("Waiting for Build {} to finish.", build.git_ref));
                loop {
                    if self.stop.is_stopped() {
                        warn!(build = build.id, "build wait cancelled");
                        break;
                    }
                    tokio::time::sleep(self.poll_interval).await;
                    if self.service.job_status(job.id).await?.is_finished() {
                        break;
                    }
                }
            }
        }
        self.service.reload(build.id).await
    }

    fn ensure_successful(&self, build: Build) -> BuildResult<Build> {
        if build.has_digest() {
            self.output
                .puts(format!("Build {} is looking good!", build.git_ref));
            info!(build = build.id, commit = %build.git_ref, "build resolved");
            Ok(build)
        } else if let Some(job) = &build.build_job {
            Err(BuildError::BuildFailed {
                reference: build.git_ref.clone(),
                status: job.status,
            })
        } else {
            Err(BuildError::NeverRan {
                reference: build.git_ref.clone(),
            })
        }
    }
}
