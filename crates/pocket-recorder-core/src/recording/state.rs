use serde::{Deserialize, Serialize};

/// Snapshot of the live recording, delivered to observers and persisted.
///
/// Invariant: `is_paused` implies `is_recording`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingState {
    /// A recording is in progress (possibly paused).
    pub is_recording: bool,
    /// The in-progress recording is paused.
    pub is_paused: bool,
    /// Whole seconds of active (unpaused) recording so far.
    pub duration_seconds: u64,
    /// File being written, while recording.
    pub active_file_ref: Option<String>,
    /// Name the finished recording will be saved under.
    pub display_name: String,
}

impl RecordingState {
    /// The state machine position this snapshot describes.
    pub fn status(&self) -> RecordingStatus {
        match (self.is_recording, self.is_paused) {
            (true, false) => RecordingStatus::Recording,
            (true, true) => RecordingStatus::Paused,
            (false, _) => RecordingStatus::Idle,
        }
    }
}

/// Position of the recording state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStatus {
    /// Nothing is being recorded.
    Idle,
    /// Capturing audio.
    Recording,
    /// A recording is open but not capturing.
    Paused,
}
