//! Executor configuration.
//!
//! Loaded from a `drydock.toml` file or constructed with defaults. Durations
//! are human-friendly strings ("2s", "500ms") parsed at the point of use.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for one rollout executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Interval between poll ticks, for both the build wait and the
    /// stability loop (e.g. "2s").
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Consecutive all-live ticks required before a rollout counts as stable.
    #[serde(default = "default_stable_ticks")]
    pub stable_ticks: u32,
    /// Cap on ticks spent in the rolling phase waiting for pods to appear.
    /// `None` keeps waiting until the rollout is cancelled; exceeding a set
    /// cap is reported as a timeout and fails the rollout.
    #[serde(default)]
    pub max_rolling_ticks: Option<u32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            stable_ticks: default_stable_ticks(),
            max_rolling_ticks: None,
        }
    }
}

fn default_poll_interval() -> String {
    "2s".to_string()
}

fn default_stable_ticks() -> u32 {
    20
}

impl ExecutorConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExecutorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parsed poll interval, falling back to 2 seconds on malformed input.
    pub fn poll_interval(&self) -> Duration {
        parse_duration(&self.poll_interval).unwrap_or(Duration::from_secs(2))
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
