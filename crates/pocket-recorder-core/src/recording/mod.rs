pub(crate) mod naming;
mod options;
mod session;
mod state;

pub use {
    naming::{recording_display_name, recording_file_name},
    options::{DEFAULT_MAX_START_RETRIES, DEFAULT_TICK_INTERVAL, RecordingOptions},
    session::{RecordingSession, SESSION_STATE_KEY},
    state::{RecordingState, RecordingStatus},
};
