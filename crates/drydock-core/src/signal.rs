//! Cooperative cancellation for a single rollout.
//!
//! An external caller raises the stop flag (with an optional reason) through
//! the [`StopHandle`]; the executor polls the matching [`StopSignal`] at its
//! defined suspension points — the top of the build-wait loop and the top of
//! every stability tick. Cancellation is never preemptive: an in-flight
//! cluster query always runs to completion.

use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
struct StopState {
    stopped: bool,
    reason: Option<String>,
}

/// Raises the stop flag for one rollout.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<StopState>,
}

/// Polled by the rollout loops to observe cancellation.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<StopState>,
}

/// Create a connected handle/signal pair for one rollout.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(StopState::default());
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    /// Signal stop. Later calls keep the first reason.
    pub fn stop(&self, reason: Option<&str>) {
        self.tx.send_modify(|state| {
            if !state.stopped {
                state.stopped = true;
                state.reason = reason.map(str::to_string);
            }
        });
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.rx.borrow().stopped
    }

    pub fn reason(&self) -> Option<String> {
        self.rx.borrow().reason.clone()
    }
}
