//! Executor error type.
//!
//! Wraps the component errors unchanged — build, release, and cluster
//! failures all halt the rollout and surface verbatim to the caller.
//! Cancellation and an unstable rollout are not errors; they come back as
//! `Ok(false)` from the executor.

use thiserror::Error;

use drydock_build::BuildError;
use drydock_cluster::ClusterError;
use drydock_release::ReleaseError;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
