//! The rollout state machine's pure core.
//!
//! ROLLING → STABILIZING → stable or unstable. The tracker sees one
//! aggregated tick view at a time and never performs I/O, so every
//! transition is unit-testable in isolation. A rollout that merely becomes
//! momentarily all-live is not trusted: stabilization demands the
//! configured number of consecutive all-live ticks, catching crash loops
//! that only manifest a few seconds after boot.

use crate::status::{RolloutStatus, StatusDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Rolling,
    Stabilizing { ticks: u32 },
}

/// What one observed tick means for the rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still waiting for all pairs to come up.
    Rolling,
    /// Every pair became live; stabilization starts at zero.
    Ready,
    /// One more consecutive all-live tick.
    Stabilizing { ticks: u32 },
    /// The stability threshold was reached; terminal success.
    Stable { ticks: u32 },
    /// A crash loop during rollout, or any non-live pair during
    /// stabilization; terminal failure.
    Unstable,
    /// The rolling phase exhausted its configured tick budget; terminal
    /// failure.
    TimedOut,
}

#[derive(Debug)]
pub struct RolloutTracker {
    phase: Phase,
    /// Consecutive all-live ticks required for a stable verdict.
    threshold: u32,
    /// Optional budget for the rolling phase; `None` waits indefinitely.
    max_rolling_ticks: Option<u32>,
    rolling_ticks: u32,
}

impl RolloutTracker {
    pub fn new(threshold: u32, max_rolling_ticks: Option<u32>) -> Self {
        Self {
            phase: Phase::Rolling,
            threshold,
            max_rolling_ticks,
            rolling_ticks: 0,
        }
    }

    /// Whether the rollout has entered its stabilization phase.
    pub fn stabilizing(&self) -> bool {
        matches!(self.phase, Phase::Stabilizing { .. })
    }

    /// Feed one tick's aggregated view through the transition function.
    pub fn observe(&mut self, statuses: &[RolloutStatus]) -> TickOutcome {
        let all_live = statuses.iter().all(|s| s.live);

        match self.phase {
            Phase::Stabilizing { ticks } => {
                if !all_live {
                    return TickOutcome::Unstable;
                }
                let ticks = ticks + 1;
                self.phase = Phase::Stabilizing { ticks };
                if ticks >= self.threshold {
                    TickOutcome::Stable { ticks }
                } else {
                    TickOutcome::Stabilizing { ticks }
                }
            }
            Phase::Rolling => {
                if all_live {
                    self.phase = Phase::Stabilizing { ticks: 0 };
                    return TickOutcome::Ready;
                }
                if statuses
                    .iter()
                    .any(|s| s.detail == StatusDetail::Restarted)
                {
                    return TickOutcome::Unstable;
                }
                self.rolling_ticks += 1;
                match self.max_rolling_ticks {
                    Some(max) if self.rolling_ticks >= max => TickOutcome::TimedOut,
                    _ => TickOutcome::Rolling,
                }
            }
        }
    }
}
