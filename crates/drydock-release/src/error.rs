//! Release planning and submission errors.

use drydock_cluster::ClusterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The store rejected the plan; carries the aggregated validation
    /// messages. Fatal and user-facing, never retried.
    #[error("Failed to create release: {messages:?}")]
    CreationFailed { messages: Vec<String> },

    /// A cluster rejected a workload submission. Aborts the rollout before
    /// monitoring begins.
    #[error("Failed to deploy to {target}: {source}")]
    ApplyFailed {
        target: String,
        source: ClusterError,
    },

    #[error("no cluster client registered for deploy group {0}")]
    UnknownGroup(i64),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("release store error: {0}")]
    Store(String),
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;
