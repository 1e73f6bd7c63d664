//! Pod and event observations returned by cluster queries.
//!
//! These are transient, per-poll values. They are never persisted; the
//! rollout state machine recomputes its view from a fresh query every tick.

use serde::{Deserialize, Serialize};

/// Selects the pods belonging to one release within one deploy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodQuery {
    pub namespace: String,
    pub release_id: i64,
    pub group_id: i64,
}

/// A single pod observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    pub release_id: i64,
    pub group_id: i64,
    pub role_id: i64,
    pub phase: PodPhase,
    /// Readiness as reported by the cluster's readiness checks.
    pub ready: bool,
    /// Container restarts since the pod was scheduled.
    pub restart_count: u32,
}

impl Pod {
    /// Running and passing readiness checks.
    pub fn live(&self) -> bool {
        self.phase == PodPhase::Running && self.ready
    }

    /// Has restarted since scheduling — a crash loop in progress.
    pub fn restarted(&self) -> bool {
        self.restart_count > 0
    }
}

/// Pod lifecycle phase as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A cluster event scoped to some object (via field selector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub reason: String,
    pub message: String,
}
