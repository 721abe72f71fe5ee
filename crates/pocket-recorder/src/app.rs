use crate::{AppCommand, AppResult};

use std::sync::Mutex;

use pocket_recorder_core::{
    ErrorKind, InterruptionCoordinator, InterruptionEvent, PlaybackSession, PlaybackState,
    PlayerStatus, RecordingSession, RecordingState, RecordingStatus, SavedRecording, Subscription,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, trace, warn};

/// Main application state.
///
/// Owns the sessions built at the application root and turns console
/// commands into session operations. The two sessions never reference
/// each other; any coordination between them happens here.
pub struct App {
    pub(crate) recording: RecordingSession,
    pub(crate) playback: PlaybackSession,
    pub(crate) interruptions: InterruptionCoordinator,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip_all)]
    pub(crate) async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        info!("Pocket Recorder starting");

        let _subscriptions = self.observe();

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Shutdown signalled");
                        break;
                    }
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(AppCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        self.finish().await;

        let _ = self.shutdown_tx.send(true);
        info!("Pocket Recorder shut down successfully");

        Ok(())
    }

    /// Log every state change and interruption while the app runs.
    fn observe(&self) -> Vec<Subscription> {
        let last_recording = Mutex::new(RecordingStatus::Idle);
        let recording = self.recording.subscribe(move |state: &RecordingState| {
            let status = state.status();
            let mut last = last_recording.lock().unwrap_or_else(|e| e.into_inner());
            if *last != status {
                info!(status = ?status, duration_seconds = state.duration_seconds, "Recording state");
                *last = status;
            } else {
                trace!(duration_seconds = state.duration_seconds, "Recording tick");
            }
        });

        let last_playback = Mutex::new(PlayerStatus::Unloaded);
        let playback = self.playback.subscribe(move |state: &PlaybackState| {
            let status = state.status();
            let mut last = last_playback.lock().unwrap_or_else(|e| e.into_inner());
            if *last != status {
                info!(
                    status = ?status,
                    position_seconds = state.position_seconds,
                    total_seconds = state.total_seconds,
                    "Playback state"
                );
                *last = status;
            } else {
                trace!(position_seconds = state.position_seconds, "Playback position");
            }
        });

        let interruptions = self.interruptions.subscribe(|event: &InterruptionEvent| {
            info!(kind = %event.kind, at = %event.timestamp, "Interruption");
        });

        vec![recording, playback, interruptions]
    }

    #[instrument(skip(self))]
    async fn handle_command(&self, command: AppCommand) {
        match command {
            AppCommand::Record => {
                if self.recording.start().await {
                    println!("recording: {}", self.recording.snapshot().display_name);
                } else {
                    report_failure("start recording", self.recording.last_error());
                }
            }
            AppCommand::Pause => {
                if self.recording.pause().await {
                    let state = self.recording.snapshot();
                    println!("paused at {}", format_duration(state.duration_seconds));
                } else {
                    println!("nothing to pause");
                }
            }
            AppCommand::Resume => {
                if !self.recording.resume().await {
                    println!("nothing to resume");
                }
            }
            AppCommand::Stop => {
                if self.recording.status() == RecordingStatus::Idle {
                    println!("nothing to stop");
                } else {
                    match self.recording.stop().await {
                        Some(saved) => println!("saved {}", describe(&saved)),
                        None => report_failure("save recording", self.recording.last_error()),
                    }
                }
            }
            AppCommand::List => self.list().await,
            AppCommand::Play(id) => self.play(&id).await,
            AppCommand::PausePlayback => {
                if !self.playback.pause().await {
                    println!("nothing is playing");
                }
            }
            AppCommand::ResumePlayback => {
                if !self.playback.resume().await {
                    println!("nothing to resume");
                }
            }
            AppCommand::StopPlayback => {
                self.playback.stop().await;
            }
            AppCommand::Seek(seconds) => {
                // The session does not clamp; keep the target inside the asset.
                let total = self.playback.snapshot().total_seconds;
                let target = if seconds.is_finite() {
                    seconds.clamp(0.0, total)
                } else {
                    0.0
                };
                if self.playback.seek_to(target).await {
                    println!("at {}", format_duration(target as u64));
                } else {
                    println!("nothing loaded");
                }
            }
            AppCommand::Volume(volume) => {
                if !self.playback.set_volume(volume.clamp(0.0, 1.0)).await {
                    println!("nothing loaded");
                }
            }
            AppCommand::Rate(rate) => {
                if !(rate.is_finite() && rate > 0.0) {
                    println!("rate must be a positive number");
                } else if !self.playback.set_playback_rate(rate).await {
                    println!("nothing loaded");
                }
            }
            AppCommand::Delete(id) => {
                if self.playback.loaded_id().as_deref() == Some(id.as_str()) {
                    self.playback.stop().await;
                }
                if self.recording.delete_recording(&id).await {
                    println!("deleted {id}");
                } else {
                    println!("no recording with id {id}");
                }
            }
            AppCommand::Interrupt(kind) => {
                let event = self.interruptions.handle(kind).await;
                debug!(handled = event.handled, "Interruption processed");
                if self.recording.status() == RecordingStatus::Paused {
                    println!("recording paused by {kind}; type 'continue' to resume");
                }
            }
            AppCommand::AppState(state) => {
                if let Some(event) = self.interruptions.on_app_state_change(state).await {
                    println!("{}", event.kind);
                }
            }
            AppCommand::ResumeAfterInterruption => {
                if !self.interruptions.resume_after_interruption().await {
                    println!("nothing to resume");
                }
            }
            AppCommand::Shutdown => {}
        }
    }

    async fn list(&self) {
        let recordings = self.recording.list_recordings().await;
        if recordings.is_empty() {
            println!("no recordings");
            return;
        }
        for recording in &recordings {
            println!("{}", describe(recording));
        }
    }

    /// Stop whatever is playing, then load and play `id`.
    async fn play(&self, id: &str) {
        let Some(recording) = self
            .recording
            .list_recordings()
            .await
            .into_iter()
            .find(|r| r.id == id)
        else {
            println!("no recording with id {id}");
            return;
        };

        self.playback.stop().await;

        if !self.playback.load(recording).await {
            report_failure("load recording", self.playback.last_error());
            return;
        }
        if !self.playback.play().await {
            report_failure("play recording", self.playback.last_error());
        }
    }

    /// Save an in-progress recording and release playback before exit.
    async fn finish(&self) {
        if self.recording.status() != RecordingStatus::Idle {
            match self.recording.stop().await {
                Some(saved) => info!(id = %saved.id, "Recording saved on shutdown"),
                None => warn!("Recording could not be saved on shutdown"),
            }
        }
        self.playback.stop().await;
    }
}

/// Tell the user an operation failed and whether trying again may help.
fn report_failure(action: &str, kind: Option<ErrorKind>) {
    error!(action, kind = ?kind, "Operation failed");
    match kind {
        Some(ErrorKind::PermissionDenied) => {
            println!("could not {action}: microphone access was denied")
        }
        Some(kind) if kind.is_retryable() => {
            println!("could not {action} ({kind:?}), please try again")
        }
        Some(kind) => println!("could not {action} ({kind:?})"),
        None => println!("could not {action}"),
    }
}

/// One line describing a saved recording.
pub(crate) fn describe(recording: &SavedRecording) -> String {
    format!(
        "{}  {}  {}",
        recording.id,
        recording.name,
        format_duration(recording.duration_seconds)
    )
}

/// `m:ss`, or `h:mm:ss` from one hour up.
pub(crate) fn format_duration(seconds: u64) -> String {
    let (hours, minutes, seconds) = (seconds / 3600, (seconds / 60) % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
