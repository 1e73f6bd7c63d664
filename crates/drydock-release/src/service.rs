//! Service ensuring.
//!
//! Before rolling out, each role gets its stable network entry point
//! guaranteed: create-if-absent, never recreate or mutate an existing
//! service. The per-role report is informational only.

use tracing::info;

use drydock_cluster::{ClusterRegistry, ServiceOutcome};
use drydock_core::JobOutput;

use crate::error::{ReleaseError, ReleaseResult};
use crate::types::Release;

/// Per-role result of ensuring a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Created,
    AlreadyExists,
    /// The role defines no service.
    None,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceStatus::Created => "Service created",
            ServiceStatus::AlreadyExists => "Service already exists",
            ServiceStatus::None => "No service",
        };
        f.write_str(s)
    }
}

/// Ensure every doc's service exists, reporting per role.
///
/// Returns the statuses in doc order. A missing service definition is never
/// a failure; cluster transport errors propagate.
pub async fn ensure_services(
    release: &Release,
    clusters: &ClusterRegistry,
    output: &JobOutput,
) -> ReleaseResult<Vec<ServiceStatus>> {
    let mut statuses = Vec::with_capacity(release.docs.len());

    for doc in &release.docs {
        let status = match doc.service_spec() {
            Some(spec) => {
                let client = clusters
                    .get(&doc.group.id)
                    .ok_or(ReleaseError::UnknownGroup(doc.group.id))?;
                let status = match client.ensure_service(&spec).await? {
                    ServiceOutcome::Created => ServiceStatus::Created,
                    ServiceOutcome::AlreadyExists => ServiceStatus::AlreadyExists,
                };
                output.puts(format!(
                    "{status} for role {} / service {}",
                    doc.role.name, spec.name
                ));
                info!(
                    release = release.id,
                    group = %doc.group.name,
                    role = %doc.role.name,
                    service = %spec.name,
                    created = status == ServiceStatus::Created,
                    "service ensured"
                );
                status
            }
            None => {
                output.puts(format!(
                    "{} for role {} / service none",
                    ServiceStatus::None,
                    doc.role.name
                ));
                ServiceStatus::None
            }
        };
        statuses.push(status);
    }

    Ok(statuses)
}
