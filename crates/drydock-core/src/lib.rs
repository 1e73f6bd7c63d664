//! drydock-core — shared domain types, configuration, and job plumbing.
//!
//! Everything a rollout needs to describe itself lives here: the job
//! descriptor (commit, project, stage), build records, the executor
//! configuration, the append-only job output sink, and the cooperative
//! stop signal polled by the long-running loops.
//!
//! No I/O happens in this crate; the cluster-facing capability interface
//! lives in `drydock-cluster` and the collaborator traits live next to
//! the components that consume them.

pub mod config;
pub mod output;
pub mod signal;
pub mod types;

pub use config::ExecutorConfig;
pub use output::JobOutput;
pub use signal::{StopHandle, StopSignal, stop_channel};
pub use types::*;
