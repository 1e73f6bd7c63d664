//! drydock-release — the immutable rollout plan and its submission.
//!
//! A release is one deploy attempt's plan: the build to ship, and one
//! release doc per (deploy group, role) pair with the replica count
//! snapshotted at plan time. Releases are written once through the
//! [`ReleaseStore`] and read-only afterwards.
//!
//! # Components
//!
//! - **`types`** — `Release`, `ReleaseDoc`, `ReleasePlan`
//! - **`store`** — the persistence collaborator plus the in-memory store
//! - **`planner`** — expands a deploy job into a persisted release
//! - **`service`** — idempotently ensures each role's network entry point
//! - **`applier`** — submits each doc's manifest to its cluster

pub mod applier;
pub mod error;
pub mod planner;
pub mod service;
pub mod store;
pub mod types;

pub use applier::create_deploys;
pub use error::{ReleaseError, ReleaseResult};
pub use planner::ReleasePlanner;
pub use service::{ServiceStatus, ensure_services};
pub use store::{InMemoryReleaseStore, ReleaseStore};
pub use types::{Release, ReleaseDoc, ReleaseId, ReleasePlan};
