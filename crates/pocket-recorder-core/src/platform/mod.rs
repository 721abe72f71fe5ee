mod audio_mode;
mod media_library;
mod player;
mod recorder;
mod simulated;

pub use {
    audio_mode::AudioMode,
    media_library::{DirectoryMediaLibrary, MediaLibrary},
    player::{PlaybackHandle, PlaybackPrimitive, PlaybackStatus},
    recorder::{RecordingHandle, RecordingPrimitive},
    simulated::SimulatedPlatform,
};
