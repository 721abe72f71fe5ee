use pocket_recorder_core::{AppState, InterruptionKind};

/// Commands sent from the console to the main application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Start a new recording.
    Record,
    /// Pause the current recording.
    Pause,
    /// Resume the paused recording.
    Resume,
    /// Stop and save the current recording.
    Stop,
    /// Print the saved recordings.
    List,
    /// Load and play the saved recording with this id.
    Play(String),
    /// Pause playback.
    PausePlayback,
    /// Resume paused playback.
    ResumePlayback,
    /// Stop playback and release the asset.
    StopPlayback,
    /// Move the playhead to this many seconds.
    Seek(f64),
    /// Set playback volume, `0.0..=1.0`.
    Volume(f32),
    /// Set playback speed.
    Rate(f32),
    /// Delete the saved recording with this id.
    Delete(String),
    /// Simulate an interruption.
    Interrupt(InterruptionKind),
    /// Simulate an app-state change.
    AppState(AppState),
    /// Resume a recording paused by an interruption.
    ResumeAfterInterruption,
    /// Request application shutdown.
    Shutdown,
}
