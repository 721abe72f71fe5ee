use crate::{
    interruption::{AppState, InterruptionEvent, InterruptionKind},
    recording::{RecordingSession, RecordingStatus},
    runtime::{Clock, Observers, Subscription},
};

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument};

struct Shared {
    recording: RecordingSession,
    clock: Arc<dyn Clock>,
    history: Mutex<Vec<InterruptionEvent>>,
    listeners: Observers<InterruptionEvent>,
    app_state: Mutex<AppState>,
}

/// Applies the interruption policy to the recording session.
///
/// | kind                                          | effect                        |
/// |-----------------------------------------------|-------------------------------|
/// | call, notification, other_app, system_alert   | pause if actively recording   |
/// | app_background                                | none, recording continues     |
/// | app_foreground                                | none, resume is manual        |
#[derive(Clone)]
pub struct InterruptionCoordinator {
    shared: Arc<Shared>,
}

impl InterruptionCoordinator {
    /// Create a coordinator driving `recording`. The app is assumed active.
    pub fn new(recording: RecordingSession, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                recording,
                clock,
                history: Mutex::new(Vec::new()),
                listeners: Observers::new(),
                app_state: Mutex::new(AppState::Active),
            }),
        }
    }

    /// Listen to every interruption. Listeners see the event before it is
    /// marked handled; a panicking listener does not affect the others or
    /// the history.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&InterruptionEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.subscribe(listener)
    }

    /// Every interruption received so far, oldest first.
    pub fn history(&self) -> Vec<InterruptionEvent> {
        self.shared
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Record `kind`, apply the policy, tell listeners, mark it handled.
    #[instrument(skip(self))]
    pub async fn handle(&self, kind: InterruptionKind) -> InterruptionEvent {
        let event = InterruptionEvent {
            kind,
            timestamp: self.shared.clock.wall(),
            handled: false,
        };

        let index = {
            let mut history = self.shared.history.lock().unwrap_or_else(|e| e.into_inner());
            history.push(event.clone());
            history.len() - 1
        };

        info!(kind = %kind, "Interruption received");

        if kind.pauses_recording() && self.shared.recording.status() == RecordingStatus::Recording
        {
            if self.shared.recording.pause().await {
                info!(kind = %kind, "Recording paused for interruption");
            } else {
                // Lost a race with stop, or the failure was already logged by the session.
                debug!(kind = %kind, "Recording not paused for interruption");
            }
        }

        self.shared.listeners.notify(&event);

        let mut history = self.shared.history.lock().unwrap_or_else(|e| e.into_inner());
        match history.get_mut(index) {
            Some(entry) => {
                entry.handled = true;
                entry.clone()
            }
            None => InterruptionEvent {
                handled: true,
                ..event
            },
        }
    }

    /// Feed a raw app-state reading. Only the edges
    /// `Active -> Background` and `Background -> Active` produce events.
    #[instrument(skip(self))]
    pub async fn on_app_state_change(&self, next: AppState) -> Option<InterruptionEvent> {
        let previous = {
            let mut current = self.shared.app_state.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *current, next)
        };

        let kind = match (previous, next) {
            (AppState::Active, AppState::Background) => InterruptionKind::AppBackground,
            (AppState::Background, AppState::Active) => InterruptionKind::AppForeground,
            _ => {
                debug!(state = ?next, "App state unchanged");
                return None;
            }
        };

        Some(self.handle(kind).await)
    }

    /// Resume a recording paused by an interruption. Safe to call at any
    /// time; does nothing unless the recording is paused.
    #[instrument(skip(self))]
    pub async fn resume_after_interruption(&self) -> bool {
        if self.shared.recording.status() != RecordingStatus::Paused {
            return false;
        }
        self.shared.recording.resume().await
    }
}
