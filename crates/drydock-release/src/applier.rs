//! Deployment submission.
//!
//! Side effect only: every release doc's manifest goes to its deploy
//! group's cluster. The first rejection aborts the rollout before
//! monitoring begins.

use tracing::info;

use drydock_cluster::ClusterRegistry;
use drydock_core::JobOutput;

use crate::error::{ReleaseError, ReleaseResult};
use crate::types::Release;

/// Submit every doc's workload manifest to its target cluster.
pub async fn create_deploys(
    release: &Release,
    clusters: &ClusterRegistry,
    output: &JobOutput,
) -> ReleaseResult<()> {
    for doc in &release.docs {
        output.puts(format!(
            "Creating deploy for {} role {}",
            doc.group.name, doc.role.name
        ));
        let client = clusters
            .get(&doc.group.id)
            .ok_or(ReleaseError::UnknownGroup(doc.group.id))?;
        let manifest = release.manifest_for(doc);
        client
            .apply(&manifest)
            .await
            .map_err(|source| ReleaseError::ApplyFailed {
                target: format!("{} role {}", doc.group.name, doc.role.name),
                source,
            })?;
        info!(
            release = release.id,
            group = %doc.group.name,
            role = %doc.role.name,
            replicas = manifest.replicas,
            "deploy submitted"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use drydock_cluster::InMemoryCluster;
    use drydock_core::{DeployGroup, Role};

    use crate::types::ReleaseDoc;

    fn release(group_count: i64) -> Release {
        let docs = (1..=group_count)
            .map(|id| ReleaseDoc {
                release_id: 1,
                group: DeployGroup {
                    id,
                    name: format!("pod{id}"),
                    namespace: "apps".to_string(),
                },
                role: Role {
                    id: 10,
                    name: "web".to_string(),
                    replicas: 3,
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

    #[tokio::test]
    async fn submits_one_manifest_per_doc() {
        let first = Arc::new(InMemoryCluster::new());
        let second = Arc::new(InMemoryCluster::new());
        let clusters: ClusterRegistry =
            HashMap::from([(1, first.clone() as _), (2, second.clone() as _)]);
        let output = JobOutput::new();

        create_deploys(&release(2), &clusters, &output).await.unwrap();

        assert_eq!(first.applied().len(), 1);
        assert_eq!(second.applied().len(), 1);
        assert_eq!(first.applied()[0].replicas, 3);
        assert!(
            output
                .transcript()
                .contains("Creating deploy for pod1 role web")
        );
    }

    #[tokio::test]
    async fn apply_rejection_aborts() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.fail_apply(true);
        let clusters: ClusterRegistry = HashMap::from([(1, cluster as _)]);

        let err = create_deploys(&release(1), &clusters, &JobOutput::new())
            .await
            .unwrap_err();
        match err {
            ReleaseError::ApplyFailed { target, .. } => {
                assert_eq!(target, "pod1 role web");
            }
            other => panic!("expected ApplyFailed, got {other}"),
        }
    }
}
