use crate::CoreResult;

use std::sync::Arc;

use async_trait::async_trait;

/// Pull-based status sample from a playback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    /// Whether the asset is still loaded.
    pub is_loaded: bool,
    /// Current position in milliseconds.
    pub position_millis: u64,
    /// Decoded duration, when the platform knows it.
    pub duration_millis: Option<u64>,
    /// Set once, on the first sample after playback reached the end.
    pub did_just_finish: bool,
}

/// Platform playback primitive.
#[async_trait]
pub trait PlaybackPrimitive: Send + Sync {
    /// Open the asset at `uri`, optionally starting playback right away.
    async fn create_and_load(&self, uri: &str, autoplay: bool)
    -> CoreResult<Arc<dyn PlaybackHandle>>;
}

/// One loaded playback asset.
#[async_trait]
pub trait PlaybackHandle: Send + Sync {
    /// Start or continue playback.
    async fn play(&self) -> CoreResult<()>;
    /// Pause playback, keeping the position.
    async fn pause(&self) -> CoreResult<()>;
    /// Halt playback.
    async fn stop(&self) -> CoreResult<()>;
    /// Release the asset.
    async fn unload(&self) -> CoreResult<()>;
    /// Move the playhead.
    async fn set_position(&self, millis: u64) -> CoreResult<()>;
    /// Set output volume, `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> CoreResult<()>;
    /// Set playback speed multiplier.
    async fn set_rate(&self, rate: f32) -> CoreResult<()>;
    /// Sample the current status.
    async fn status(&self) -> CoreResult<PlaybackStatus>;
}
