//! drydock-rollout — drives one deploy attempt to a terminal verdict.
//!
//! The executor composes the whole pipeline: resolve a build, plan the
//! release, ensure services, submit deployments, then poll pod health
//! across every deploy group until the rollout is stable, unstable, or
//! cancelled. On an unstable verdict it collects cluster events and
//! container logs for the implicated pods.
//!
//! # Architecture
//!
//! ```text
//! DeployExecutor
//!   ├── BuildResolver          (drydock-build)
//!   ├── ReleasePlanner         (drydock-release)
//!   ├── ensure_services        (drydock-release)
//!   ├── create_deploys         (drydock-release)
//!   ├── StabilityMonitor
//!   │   ├── per-group pod queries, issued concurrently
//!   │   ├── release_status()   — pure per-pair classification
//!   │   └── RolloutTracker     — pure ROLLING → STABILIZING machine
//!   └── show_failure_cause()   — best-effort events + logs
//! ```
//!
//! The state machine's transition function is pure and synchronous; the
//! monitor wraps it in a timer-driven tick loop that observes the stop
//! signal at the top of every iteration, before any cluster query.

pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod status;
pub mod tracker;

pub use diagnostics::show_failure_cause;
pub use error::{ExecutorError, ExecutorResult};
pub use executor::DeployExecutor;
pub use monitor::{RolloutVerdict, StabilityMonitor};
pub use status::{RolloutStatus, StatusDetail, release_status};
pub use tracker::{RolloutTracker, TickOutcome};
