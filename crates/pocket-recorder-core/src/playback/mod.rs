mod options;
mod session;
mod state;

pub use {
    options::{DEFAULT_POLL_INTERVAL, PlaybackOptions},
    session::PlaybackSession,
    state::{PlaybackState, PlayerStatus},
};
