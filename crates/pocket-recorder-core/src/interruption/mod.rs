mod coordinator;
mod event;

pub use {
    coordinator::InterruptionCoordinator,
    event::{AppState, InterruptionEvent, InterruptionKind},
};
