use crate::storage::SavedRecording;

use serde::Serialize;

/// Snapshot of the live playback, delivered to observers.
///
/// Invariants: `is_playing` implies `loaded_recording.is_some()`, and
/// `is_playing` and `is_paused` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Audio is playing.
    pub is_playing: bool,
    /// Playback is paused mid-asset.
    pub is_paused: bool,
    /// Playhead position.
    pub position_seconds: f64,
    /// Length of the loaded asset.
    pub total_seconds: f64,
    /// The recording currently loaded, if any.
    pub loaded_recording: Option<SavedRecording>,
}

impl PlaybackState {
    /// The state machine position this snapshot describes.
    pub fn status(&self) -> PlayerStatus {
        match (&self.loaded_recording, self.is_playing, self.is_paused) {
            (None, _, _) => PlayerStatus::Unloaded,
            (Some(_), true, _) => PlayerStatus::Playing,
            (Some(_), false, true) => PlayerStatus::Paused,
            (Some(_), false, false) => PlayerStatus::Loaded,
        }
    }
}

/// Position of the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// No asset loaded.
    Unloaded,
    /// Asset loaded and stopped.
    Loaded,
    /// Asset playing.
    Playing,
    /// Asset paused.
    Paused,
}
