//! Failure diagnosis for an unstable rollout.
//!
//! Re-queries every deploy group for pods that are restarted or not live,
//! then prints each implicated pod's cluster events (deduplicated) and
//! container logs — the previous container's logs when the pod restarted,
//! since that instance is the one that crashed. Everything here is
//! best-effort: a failed query is logged and skipped, never escalated.

use std::collections::HashSet;

use tracing::warn;

use drydock_cluster::{ClusterRegistry, Event};
use drydock_core::JobOutput;
use drydock_release::Release;

/// Collect and print events and logs for every bad pod of the release.
pub async fn show_failure_cause(
    release: &Release,
    clusters: &ClusterRegistry,
    output: &JobOutput,
) {
    for group in release.deploy_groups() {
        let Some(client) = clusters.get(&group.id) else {
            warn!(group = group.id, "no cluster client while diagnosing");
            continue;
        };

        let pods = match client.get_pods(&release.pod_query(group)).await {
            Ok(pods) => pods,
            Err(e) => {
                warn!(group = %group.name, error = %e, "pod listing failed while diagnosing");
                continue;
            }
        };

        for pod in pods.iter().filter(|p| p.restarted() || !p.live()) {
            output.puts(format!("\n{} pod {}:", group.name, pod.name));

            // Events first — scheduling pressure shows up here.
            output.puts("EVENTS:");
            let selector = format!("involvedObject.name={}", pod.name);
            match client.get_events(&group.namespace, &selector).await {
                Ok(events) => {
                    for event in dedup_events(events) {
                        output.puts(format!("{}: {}", event.reason, event.message));
                    }
                }
                Err(e) => {
                    warn!(pod = %pod.name, error = %e, "event fetch failed while diagnosing");
                }
            }

            // Then logs — boot failures show up here.
            output.puts("\nLOGS:");
            match client
                .get_pod_log(&pod.name, &group.namespace, pod.restarted())
                .await
            {
                Ok(log) => output.puts(log),
                Err(e) => {
                    warn!(pod = %pod.name, error = %e, "log fetch failed while diagnosing");
                }
            }
        }
    }
}

/// Collapse events whose messages have identical sorted-line content, so
/// repeated identical events print once.
fn dedup_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut unique = Vec::new();
    for event in events {
        let mut key: Vec<String> = event.message.lines().map(str::to_string).collect();
        key.sort();
        if seen.insert(key) {
            unique.push(event);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use drydock_cluster::{InMemoryCluster, Pod, PodPhase};
    use drydock_core::{DeployGroup, Role};
    use drydock_release::ReleaseDoc;

    fn event(reason: &str, message: &str) -> Event {
        Event {
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }

    fn release() -> Release {
        Release {
            id: 1,
            build_id: 1,
            docker_repo_digest: "registry/app@sha256:beef".to_string(),
            user_id: 1,
            project_id: 1,
            docs: vec![ReleaseDoc {
                release_id: 1,
                group: DeployGroup {
                    id: 1,
                    name: "pod1".to_string(),
                    namespace: "apps".to_string(),
                },
                role: Role {
                    id: 10,
                    name: "web".to_string(),
                    replicas: 1,
                    service_name: None,
                },
            }],
        }
    }

    fn pod(name: &str, ready: bool, restarts: u32) -> Pod {
        Pod {
            name: name.to_string(),
            namespace: "apps".to_string(),
            release_id: 1,
            group_id: 1,
            role_id: 10,
            phase: PodPhase::Running,
            ready,
            restart_count: restarts,
        }
    }

    #[test]
    fn dedup_collapses_identical_messages() {
        let events = vec![
            event("FailedScheduling", "insufficient cpu"),
            event("FailedScheduling", "insufficient cpu"),
            event("BackOff", "restarting failed container"),
        ];
        let unique = dedup_events(events);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].reason, "FailedScheduling");
        assert_eq!(unique[1].reason, "BackOff");
    }

    #[test]
    fn dedup_ignores_line_order() {
        let events = vec![
            event("Pulled", "line a\nline b"),
            event("Pulled", "line b\nline a"),
        ];
        assert_eq!(dedup_events(events).len(), 1);
    }

    #[tokio::test]
    async fn prints_events_and_previous_logs_for_restarted_pod() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.set_pods(vec![pod("web-1", true, 1), pod("web-2", true, 0)]);
        cluster.push_event("web-1", event("BackOff", "restarting failed container"));
        cluster.set_log("web-1", true, "panic: boot failed");
        let clusters: ClusterRegistry = HashMap::from([(1, cluster as _)]);

        let output = JobOutput::new();
        show_failure_cause(&release(), &clusters, &output).await;

        let transcript = output.transcript();
        assert!(transcript.contains("pod1 pod web-1:"));
        assert!(transcript.contains("BackOff: restarting failed container"));
        assert!(transcript.contains("panic: boot failed"));
        // The healthy pod is not implicated.
        assert!(!transcript.contains("web-2"));
    }

    #[tokio::test]
    async fn current_logs_for_never_restarted_pod() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.set_pods(vec![pod("web-1", false, 0)]);
        cluster.set_log("web-1", false, "still starting up");
        let clusters: ClusterRegistry = HashMap::from([(1, cluster as _)]);

        let output = JobOutput::new();
        show_failure_cause(&release(), &clusters, &output).await;
        assert!(output.transcript().contains("still starting up"));
    }

    #[tokio::test]
    async fn query_failures_do_not_abort() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.fail_get_pods(true);
        let clusters: ClusterRegistry = HashMap::from([(1, cluster as _)]);

        let output = JobOutput::new();
        show_failure_cause(&release(), &clusters, &output).await;
        assert_eq!(output.lines(), Vec::<String>::new());
    }
}
