use std::time::Duration;

/// Default period of the duration ticker.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of extra attempts, each with a fresh recorder handle.
pub const DEFAULT_MAX_START_RETRIES: u32 = 2;

/// Tuning for a [`RecordingSession`](crate::RecordingSession).
#[derive(Debug, Clone)]
pub struct RecordingOptions {
    /// How often the duration ticker refreshes `duration_seconds`.
    pub tick_interval: Duration,
    /// Extra start attempts after the first one fails.
    pub max_start_retries: u32,
    /// Extension of recorded files, without the dot.
    pub file_extension: String,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_start_retries: DEFAULT_MAX_START_RETRIES,
            file_extension: "m4a".to_string(),
        }
    }
}
