use crate::{CoreResult, platform::AudioMode};

use std::sync::Arc;

use async_trait::async_trait;

/// Platform recording primitive.
///
/// Owned exclusively by a [`RecordingSession`](crate::RecordingSession).
#[async_trait]
pub trait RecordingPrimitive: Send + Sync {
    /// Ask for microphone access. `Ok(false)` means the user declined.
    async fn request_permission(&self) -> CoreResult<bool>;

    /// Apply an audio session configuration.
    async fn set_audio_mode(&self, mode: &AudioMode) -> CoreResult<()>;

    /// Allocate a fresh recording handle that will write to `file_name`.
    async fn create_recording(&self, file_name: &str) -> CoreResult<Arc<dyn RecordingHandle>>;
}

/// One underlying recording. Cannot survive a process restart.
#[async_trait]
pub trait RecordingHandle: Send + Sync {
    /// Prepare the recorder for capture.
    async fn prepare(&self) -> CoreResult<()>;

    /// Start capturing, or continue after [`RecordingHandle::pause`].
    async fn start(&self) -> CoreResult<()>;

    /// Suspend capture without finalizing the file.
    async fn pause(&self) -> CoreResult<()>;

    /// Finalize the file and release the recorder.
    async fn stop_and_unload(&self) -> CoreResult<()>;

    /// Location of the file being written, if known.
    fn file_uri(&self) -> Option<String>;
}
