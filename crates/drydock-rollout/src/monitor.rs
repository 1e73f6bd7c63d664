//! The stability monitor — timer-driven shell around the pure tracker.
//!
//! Every tick: check the stop signal, query all deploy groups concurrently,
//! aggregate, classify every (role, group) pair, print the status table,
//! and feed the tracker. The fixed interval has no backoff and no jitter;
//! the full aggregate view is always collected before any transition runs.

use std::sync::Arc;

use futures_util::future;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use drydock_cluster::{ClusterClient, ClusterRegistry, Pod};
use drydock_core::{ExecutorConfig, JobOutput, StopSignal};
use drydock_release::{Release, ReleaseError};

use crate::error::ExecutorResult;
use crate::status::{RolloutStatus, print_statuses, release_status};
use crate::tracker::{RolloutTracker, TickOutcome};

/// Terminal verdict of one monitored rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutVerdict {
    /// Every pair stayed live through the stability test.
    Stable,
    /// A crash loop or lost pair; diagnostics should follow.
    Unstable,
    /// Cancelled cooperatively; no diagnostics.
    Stopped,
}

pub struct StabilityMonitor {
    release: Release,
    clusters: ClusterRegistry,
    output: JobOutput,
    stop: StopSignal,
    config: ExecutorConfig,
}

impl StabilityMonitor {
    pub fn new(
        release: Release,
        clusters: ClusterRegistry,
        output: JobOutput,
        stop: StopSignal,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            release,
            clusters,
            output,
            stop,
            config,
        }
    }

    /// Poll until the rollout reaches a terminal state.
    ///
    /// The stop signal is observed at the top of every iteration, before
    /// any cluster query is issued. A failed pod query fails the rollout
    /// with the cluster error.
    pub async fn wait_for_release(&self) -> ExecutorResult<RolloutVerdict> {
        let threshold = self.config.stable_ticks;
        let mut tracker = RolloutTracker::new(threshold, self.config.max_rolling_ticks);
        let mut ticker = time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if self.stop.is_stopped() {
                self.output.puts("STOPPED");
                info!(release = self.release.id, reason = ?self.stop.reason(), "rollout stopped");
                return Ok(RolloutVerdict::Stopped);
            }

            let statuses = self.poll_statuses().await?;
            match tracker.observe(&statuses) {
                TickOutcome::Rolling => {
                    print_statuses(&statuses, &self.output);
                }
                TickOutcome::Ready => {
                    print_statuses(&statuses, &self.output);
                    self.output.puts("READY, starting stability test");
                    info!(release = self.release.id, threshold, "all pairs live, stabilizing");
                }
                TickOutcome::Stabilizing { ticks } => {
                    self.output.puts(format!("Stable {ticks}/{threshold}"));
                }
                TickOutcome::Stable { ticks } => {
                    self.output.puts(format!("Stable {ticks}/{threshold}"));
                    self.output.puts("SUCCESS");
                    info!(release = self.release.id, "rollout stable");
                    return Ok(RolloutVerdict::Stable);
                }
                TickOutcome::Unstable => {
                    print_statuses(&statuses, &self.output);
                    self.output.puts("UNSTABLE - service is restarting");
                    warn!(release = self.release.id, "rollout unstable");
                    return Ok(RolloutVerdict::Unstable);
                }
                TickOutcome::TimedOut => {
                    print_statuses(&statuses, &self.output);
                    self.output.puts(format!(
                        "UNSTABLE - pods not up after {} ticks",
                        self.config.max_rolling_ticks.unwrap_or_default()
                    ));
                    warn!(release = self.release.id, "rollout timed out waiting for pods");
                    return Ok(RolloutVerdict::Unstable);
                }
            }
        }
    }

    /// One aggregate view: every deploy group queried concurrently, results
    /// collected in full before classification.
    async fn poll_statuses(&self) -> ExecutorResult<Vec<RolloutStatus>> {
        let mut queries = Vec::new();
        for group in self.release.deploy_groups() {
            let client: Arc<dyn ClusterClient> = self
                .clusters
                .get(&group.id)
                .cloned()
                .ok_or(ReleaseError::UnknownGroup(group.id))?;
            let query = self.release.pod_query(group);
            queries.push(async move { client.get_pods(&query).await });
        }

        let mut pods: Vec<Pod> = Vec::new();
        for result in future::join_all(queries).await {
            pods.extend(result?);
        }

        Ok(self
            .release
            .docs
            .iter()
            .map(|doc| release_status(&pods, doc))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use drydock_cluster::{InMemoryCluster, PodPhase};
    use drydock_core::{DeployGroup, Role, stop_channel};
    use drydock_release::ReleaseDoc;

    fn group(id: i64) -> DeployGroup {
        DeployGroup {
            id,
            name: format!("pod{id}"),
            namespace: "apps".to_string(),
        }
    }

    fn release(groups: &[i64]) -> Release {
        let docs = groups
            .iter()
            .map(|&id| ReleaseDoc {
                release_id: 1,
                group: group(id),
                role: Role {
                    id: 10,
                    name: "web".to_string(),
                    replicas: 1,
                    service_name: None,
                },
            })
            .collect();
        Release {
            id: 1,
            build_id: 1,
            docker_repo_digest: "registry/app@sha256:beef".to_string(),
            user_id: 1,
            project_id: 1,
            docs,
        }
    }

    fn live_pod(group_id: i64) -> drydock_cluster::Pod {
        drydock_cluster::Pod {
            name: format!("web-{group_id}"),
            namespace: "apps".to_string(),
            release_id: 1,
            group_id,
            role_id: 10,
            phase: PodPhase::Running,
            ready: true,
            restart_count: 0,
        }
    }

    fn config(stable_ticks: u32) -> ExecutorConfig {
        ExecutorConfig {
            stable_ticks,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn aggregates_across_groups_before_judging() {
        let first = Arc::new(InMemoryCluster::new());
        let second = Arc::new(InMemoryCluster::new());
        first.set_pods(vec![live_pod(1)]);
        second.set_pods(vec![live_pod(2)]);
        let clusters: ClusterRegistry =
            HashMap::from([(1, first.clone() as _), (2, second.clone() as _)]);

        let output = JobOutput::new();
        let (_handle, stop) = stop_channel();
        let monitor =
            StabilityMonitor::new(release(&[1, 2]), clusters, output.clone(), stop, config(2));

        let verdict = monitor.wait_for_release().await.unwrap();
        assert_eq!(verdict, RolloutVerdict::Stable);
        // Both groups were queried on every tick: ready + 2 stabilizing.
        assert_eq!(first.pod_queries(), 3);
        assert_eq!(second.pod_queries(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_checked_before_any_query() {
        let cluster = Arc::new(InMemoryCluster::new());
        let clusters: ClusterRegistry = HashMap::from([(1, cluster.clone() as _)]);

        let output = JobOutput::new();
        let (handle, stop) = stop_channel();
        handle.stop(Some("cancelled before start"));

        let monitor =
            StabilityMonitor::new(release(&[1]), clusters, output.clone(), stop, config(20));
        let verdict = monitor.wait_for_release().await.unwrap();

        assert_eq!(verdict, RolloutVerdict::Stopped);
        assert_eq!(cluster.pod_queries(), 0);
        assert_eq!(output.lines(), vec!["STOPPED"]);
    }

    #[tokio::test(start_paused = true)]
    async fn query_failure_fails_the_rollout() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.fail_get_pods(true);
        let clusters: ClusterRegistry = HashMap::from([(1, cluster as _)]);

        let (_handle, stop) = stop_channel();
        let monitor = StabilityMonitor::new(
            release(&[1]),
            clusters,
            JobOutput::new(),
            stop,
            config(20),
        );
        assert!(monitor.wait_for_release().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_client_is_an_error() {
        let (_handle, stop) = stop_channel();
        let monitor = StabilityMonitor::new(
            release(&[1]),
            HashMap::new(),
            JobOutput::new(),
            stop,
            config(20),
        );
        assert!(monitor.wait_for_release().await.is_err());
    }
}
