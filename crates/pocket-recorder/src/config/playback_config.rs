use crate::config::{DEFAULT_POLL_INTERVAL_MS, default_poll_interval_ms};

use std::time::Duration;

use pocket_recorder_core::PlaybackOptions;
use serde::{Deserialize, Serialize};

/// Playback session tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Period of the position poller, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl PlaybackConfig {
    /// Session options for this configuration.
    pub fn to_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
