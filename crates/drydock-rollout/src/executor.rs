//! The deploy executor — one invocation drives one deploy attempt.
//!
//! Composition order: resolve build → plan release → ensure services →
//! apply deployments → monitor until terminal → diagnose on failure.
//! User errors (build failed, release rejected, apply rejected) halt the
//! pipeline and surface verbatim; cancellation and an unstable rollout are
//! clean `false` results distinguished by their transcript markers.

use std::sync::Arc;

use tracing::info;

use drydock_build::{BuildResolver, BuildService};
use drydock_cluster::ClusterRegistry;
use drydock_core::{DeployJob, ExecutorConfig, JobOutput, StopSignal};
use drydock_release::{ReleasePlanner, ReleaseStore, create_deploys, ensure_services};

use crate::diagnostics::show_failure_cause;
use crate::error::ExecutorResult;
use crate::monitor::{RolloutVerdict, StabilityMonitor};

pub struct DeployExecutor {
    job: DeployJob,
    config: ExecutorConfig,
    builds: Arc<dyn BuildService>,
    releases: Arc<dyn ReleaseStore>,
    clusters: ClusterRegistry,
    output: JobOutput,
    stop: StopSignal,
}

impl DeployExecutor {
    pub fn new(
        job: DeployJob,
        config: ExecutorConfig,
        builds: Arc<dyn BuildService>,
        releases: Arc<dyn ReleaseStore>,
        clusters: ClusterRegistry,
        output: JobOutput,
        stop: StopSignal,
    ) -> Self {
        Self {
            job,
            config,
            builds,
            releases,
            clusters,
            output,
            stop,
        }
    }

    /// Run the deploy to a terminal state.
    ///
    /// Returns `Ok(true)` when the rollout stabilized, `Ok(false)` when it
    /// was unstable or cancelled (the transcript says which), and `Err`
    /// when a user error halted the pipeline.
    pub async fn execute(&self) -> ExecutorResult<bool> {
        info!(
            deploy = self.job.deploy_id,
            commit = %self.job.commit,
            project = %self.job.project.name,
            stage = %self.job.stage.name,
            "rollout starting"
        );

        let resolver = BuildResolver::new(
            self.builds.clone(),
            self.output.clone(),
            self.stop.clone(),
            self.config.poll_interval(),
        );
        let build = resolver.resolve(&self.job).await?;
        if self.stopped() {
            return Ok(false);
        }

        let planner = ReleasePlanner::new(self.releases.clone(), self.output.clone());
        let release = planner.create_release(&self.job, &build).await?;

        ensure_services(&release, &self.clusters, &self.output).await?;
        create_deploys(&release, &self.clusters, &self.output).await?;

        let monitor = StabilityMonitor::new(
            release.clone(),
            self.clusters.clone(),
            self.output.clone(),
            self.stop.clone(),
            self.config.clone(),
        );
        match monitor.wait_for_release().await? {
            RolloutVerdict::Stable => Ok(true),
            RolloutVerdict::Stopped => Ok(false),
            RolloutVerdict::Unstable => {
                show_failure_cause(&release, &self.clusters, &self.output).await;
                Ok(false)
            }
        }
    }

    /// Observe the stop signal, announcing the stop once when raised.
    fn stopped(&self) -> bool {
        if self.stop.is_stopped() {
            self.output.puts("STOPPED");
            true
        } else {
            false
        }
    }
}
