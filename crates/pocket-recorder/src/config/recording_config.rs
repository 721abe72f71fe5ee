use crate::config::{
    DEFAULT_FILE_EXTENSION, DEFAULT_MAX_START_RETRIES, DEFAULT_TICK_INTERVAL_MS,
    default_file_extension, default_max_start_retries, default_tick_interval_ms,
};

use std::time::Duration;

use pocket_recorder_core::RecordingOptions;
use serde::{Deserialize, Serialize};

/// Recording session tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Period of the duration ticker, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Extra start attempts with a fresh recorder after a failure.
    #[serde(default = "default_max_start_retries")]
    pub max_start_retries: u32,
    /// Extension of recorded files, without the dot.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl RecordingConfig {
    /// Session options for this configuration.
    pub fn to_options(&self) -> RecordingOptions {
        RecordingOptions {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_start_retries: self.max_start_retries,
            file_extension: self.file_extension.clone(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_start_retries: DEFAULT_MAX_START_RETRIES,
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
        }
    }
}
