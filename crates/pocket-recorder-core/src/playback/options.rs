use std::time::Duration;

/// Default period of the position poller.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Tuning for a [`PlaybackSession`](crate::PlaybackSession).
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// How often the playing asset's status is sampled.
    pub poll_interval: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
