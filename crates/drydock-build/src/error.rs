//! Build resolution errors.
//!
//! `BuildFailed` and `NeverRan` are user-facing: they halt the rollout and
//! carry the manual-rerun hint verbatim.

use drydock_core::BuildJobStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build {reference} is {status}, rerun it manually.")]
    BuildFailed {
        reference: String,
        status: BuildJobStatus,
    },

    #[error("Build {reference} was created but never ran, run it manually.")]
    NeverRan { reference: String },

    #[error("build service error: {0}")]
    Service(String),
}

pub type BuildResult<T> = Result<T, BuildError>;
