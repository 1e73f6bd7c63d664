//! Per-pair rollout status, recomputed every tick.
//!
//! A [`RolloutStatus`] is an immutable value derived from one poll's pod
//! observations; nothing here is carried across ticks, which keeps the
//! state machine's transition function pure.

use drydock_cluster::{Pod, PodPhase};
use drydock_core::JobOutput;
use drydock_release::ReleaseDoc;

/// Why a (role, group) pair is or is not live this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDetail {
    /// Pod running, ready, and never restarted.
    Live,
    /// No pod matched the pair.
    Missing,
    /// Pod is ready but has restarted since scheduling — crash loop.
    Restarted,
    /// Pod exists but is not ready yet.
    Waiting { phase: PodPhase },
}

impl std::fmt::Display for StatusDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusDetail::Live => f.write_str("Live"),
            StatusDetail::Missing => f.write_str("Missing"),
            StatusDetail::Restarted => f.write_str("Restarted"),
            StatusDetail::Waiting { phase } => write!(f, "Waiting ({phase}, not Ready)"),
        }
    }
}

/// One (role, group) pair's status for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutStatus {
    pub live: bool,
    pub detail: StatusDetail,
    pub role: String,
    pub group: String,
}

/// Classify one release doc against the aggregated pod view.
pub fn release_status(pods: &[Pod], doc: &ReleaseDoc) -> RolloutStatus {
    let pod = pods
        .iter()
        .find(|p| p.role_id == doc.role.id && p.group_id == doc.group.id);

    let (live, detail) = match pod {
        Some(pod) if pod.live() => {
            if pod.restarted() {
                (false, StatusDetail::Restarted)
            } else {
                (true, StatusDetail::Live)
            }
        }
        Some(pod) => (false, StatusDetail::Waiting { phase: pod.phase }),
        None => (false, StatusDetail::Missing),
    };

    RolloutStatus {
        live,
        detail,
        role: doc.role.name.clone(),
        group: doc.group.name.clone(),
    }
}

/// Print the per-cluster, per-role status table, grouped in first-appearance
/// order.
pub fn print_statuses(statuses: &[RolloutStatus], output: &JobOutput) {
    let mut groups: Vec<&str> = Vec::new();
    for status in statuses {
        if !groups.contains(&status.group.as_str()) {
            groups.push(&status.group);
        }
    }
    for group in groups {
        output.puts(format!("{group}:"));
        for status in statuses.iter().filter(|s| s.group == group) {
            output.puts(format!("  {}: {}", status.role, status.detail));
        }
    }
}
