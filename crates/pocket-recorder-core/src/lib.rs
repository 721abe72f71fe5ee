//! Pocket Recorder Core Library
//!
//! Recording and playback state machines for a voice memo app, with
//! interruption handling and a durable catalog of finished recordings.
//! Platform audio, storage and scheduling are collaborators behind traits;
//! [`SimulatedPlatform`], [`MemoryStore`] and [`ManualScheduler`] stand in
//! for them in tests and demos.
//!
//! # Example
//!
//! ```no_run
//! use pocket_recorder_core::{
//!     MemoryStore, RecordingCatalog, RecordingOptions, RecordingSession, SessionContext,
//!     SimulatedPlatform, SystemClock, TokioScheduler,
//! };
//!
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let clock = Arc::new(SystemClock::new());
//! let store = Arc::new(MemoryStore::new());
//! let context = SessionContext {
//!     clock: clock.clone(),
//!     scheduler: Arc::new(TokioScheduler),
//!     store: store.clone(),
//! };
//! let platform = Arc::new(SimulatedPlatform::new(clock));
//! let recording = RecordingSession::new(
//!     platform,
//!     RecordingCatalog::new(store),
//!     context,
//!     RecordingOptions::default(),
//! );
//!
//! if recording.start().await {
//!     let saved = recording.stop().await;
//!     println!("Saved: {:?}", saved);
//! }
//! # }
//! ```

mod error;
mod interruption;
mod platform;
mod playback;
mod recording;
mod runtime;
mod storage;

pub use {
    error::{ErrorKind, Result as CoreResult, SessionError},
    interruption::{AppState, InterruptionCoordinator, InterruptionEvent, InterruptionKind},
    platform::{
        AudioMode, DirectoryMediaLibrary, MediaLibrary, PlaybackHandle, PlaybackPrimitive,
        PlaybackStatus, RecordingHandle, RecordingPrimitive, SimulatedPlatform,
    },
    playback::{DEFAULT_POLL_INTERVAL, PlaybackOptions, PlaybackSession, PlaybackState, PlayerStatus},
    recording::{
        DEFAULT_MAX_START_RETRIES, DEFAULT_TICK_INTERVAL, RecordingOptions, RecordingSession,
        RecordingState, RecordingStatus, SESSION_STATE_KEY, recording_display_name,
        recording_file_name,
    },
    runtime::{
        Clock, ManualClock, ManualScheduler, Observers, Scheduler, SessionContext, Subscription,
        SystemClock, TickHandle, TickTask, TokioScheduler,
    },
    storage::{
        CATALOG_KEY, FileStore, KeyValueStore, MemoryStore, RecordingCatalog, SavedRecording,
    },
};

#[cfg(test)]
mod tests;
