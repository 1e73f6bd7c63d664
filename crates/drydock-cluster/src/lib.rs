//! drydock-cluster — the capability interface to a target cluster.
//!
//! Every deploy group is backed by one [`ClusterClient`]: an explicit,
//! injectable capability set instead of a duck-typed API object. The
//! orchestrator only ever needs five operations:
//!
//! - `get_pods` — list the pods belonging to a release in one group
//! - `get_events` — fetch events scoped to a pod (failure diagnostics)
//! - `get_pod_log` — fetch container logs, current or previous instance
//! - `apply` — submit a workload manifest
//! - `ensure_service` — create-if-absent a role's network entry point
//!
//! [`InMemoryCluster`] is the reference backend used by the test suites;
//! real backends implement the same trait per cluster API.

pub mod client;
pub mod memory;
pub mod pod;

pub use client::{
    ClusterClient, ClusterError, ClusterRegistry, ClusterResult, ServiceOutcome, ServiceSpec,
    WorkloadManifest, WorkloadSelector,
};
pub use memory::InMemoryCluster;
pub use pod::{Event, Pod, PodPhase, PodQuery};
