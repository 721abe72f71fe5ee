//! Playback state machine: `Unloaded -> Loaded -> Playing <-> Paused`,
//! with `stop` returning to `Unloaded` from anywhere.
//!
//! A generation counter is bumped by every `load` and `stop`; results of
//! platform calls that resume under an older generation are discarded.

use crate::{
    CoreResult, ErrorKind, SessionError,
    platform::{PlaybackHandle, PlaybackPrimitive},
    playback::{PlaybackOptions, PlaybackState, PlayerStatus},
    runtime::{Observers, SessionContext, Subscription, TickHandle, TickTask},
    storage::SavedRecording,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unloaded,
    Loading,
    Loaded,
    Playing,
    Paused,
}

struct Inner {
    phase: Phase,
    state: PlaybackState,
    handle: Option<Arc<dyn PlaybackHandle>>,
    poller: Option<TickHandle>,
    generation: u64,
    /// A play or pause call is awaiting the platform.
    pending: bool,
    last_error: Option<ErrorKind>,
}

impl Inner {
    fn cancel_poller(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
    }
}

struct Shared {
    primitive: Arc<dyn PlaybackPrimitive>,
    context: SessionContext,
    options: PlaybackOptions,
    observers: Observers<PlaybackState>,
    inner: Mutex<Inner>,
}

/// The single live playback session.
///
/// At most one asset is loaded at a time; loading another releases the
/// previous one first.
#[derive(Clone)]
pub struct PlaybackSession {
    shared: Arc<Shared>,
}

impl PlaybackSession {
    /// Create an unloaded session.
    pub fn new(
        primitive: Arc<dyn PlaybackPrimitive>,
        context: SessionContext,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                primitive,
                context,
                options,
                observers: Observers::new(),
                inner: Mutex::new(Inner {
                    phase: Phase::Unloaded,
                    state: PlaybackState::default(),
                    handle: None,
                    poller: None,
                    generation: 0,
                    pending: false,
                    last_error: None,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> PlaybackState {
        self.lock().state.clone()
    }

    /// Current state machine position.
    pub fn status(&self) -> PlayerStatus {
        self.lock().state.status()
    }

    /// Id of the loaded recording.
    pub fn loaded_id(&self) -> Option<String> {
        self.lock()
            .state
            .loaded_recording
            .as_ref()
            .map(|r| r.id.clone())
    }

    /// Kind of the most recent failure, cleared by the next successful load.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.lock().last_error
    }

    /// Observe every state change, synchronously and in subscription order.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&PlaybackState) + Send + Sync + 'static,
    {
        self.shared.observers.subscribe(observer)
    }

    /// Open `recording` for playback, releasing any asset already loaded.
    #[instrument(skip(self, recording), fields(id = %recording.id))]
    pub async fn load(&self, recording: SavedRecording) -> bool {
        self.stop().await;

        let generation = {
            let mut inner = self.lock();
            if inner.phase != Phase::Unloaded {
                // Another load claimed the session while we were stopping.
                return false;
            }
            inner.phase = Phase::Loading;
            inner.generation += 1;
            inner.generation
        };

        let handle = match self.open(&recording.file_uri).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(uri = %recording.file_uri, error = ?e, "Failed to load recording");
                let mut inner = self.lock();
                inner.last_error = Some(e.kind());
                if inner.generation == generation {
                    inner.phase = Phase::Unloaded;
                }
                return false;
            }
        };

        let decoded_seconds = match handle.status().await {
            Ok(status) => status.duration_millis.map(millis_to_seconds),
            Err(e) => {
                debug!(error = ?e, "Status unavailable right after load");
                None
            }
        };
        let total_seconds = decoded_seconds.unwrap_or(recording.duration_seconds as f64);

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.phase != Phase::Loading {
                None
            } else {
                inner.phase = Phase::Loaded;
                inner.handle = Some(Arc::clone(&handle));
                inner.state = PlaybackState {
                    is_playing: false,
                    is_paused: false,
                    position_seconds: 0.0,
                    total_seconds,
                    loaded_recording: Some(recording),
                };
                inner.last_error = None;
                Some(inner.state.clone())
            }
        };

        let Some(snapshot) = snapshot else {
            debug!("Load superseded, releasing asset");
            Self::release(handle).await;
            return false;
        };

        info!(total_seconds, "Recording loaded");
        self.shared.observers.notify(&snapshot);
        true
    }

    async fn open(&self, uri: &str) -> CoreResult<Arc<dyn PlaybackHandle>> {
        self.shared
            .primitive
            .create_and_load(uri, false)
            .await
            .map_err(|e| match e {
                load @ SessionError::Load { .. } => load,
                other => SessionError::Load {
                    uri: uri.to_string(),
                    reason: other.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
            })
    }

    /// Start or continue playback. Valid from `Loaded` or `Paused`.
    #[instrument(skip(self))]
    pub async fn play(&self) -> bool {
        let (handle, generation) = {
            let mut inner = self.lock();
            if !matches!(inner.phase, Phase::Loaded | Phase::Paused) || inner.pending {
                return false;
            }
            let Some(handle) = inner.handle.clone() else {
                return false;
            };
            inner.pending = true;
            (handle, inner.generation)
        };

        let result = handle.play().await;

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return false;
            }
            inner.pending = false;
            match result {
                Ok(()) => {
                    inner.phase = Phase::Playing;
                    inner.state.is_playing = true;
                    inner.state.is_paused = false;
                    inner.poller = Some(self.schedule_poller());
                    inner.state.clone()
                }
                Err(e) => {
                    error!(error = ?e, "Failed to start playback");
                    inner.last_error = Some(e.kind());
                    return false;
                }
            }
        };

        debug!(position_seconds = snapshot.position_seconds, "Playback started");
        self.shared.observers.notify(&snapshot);
        true
    }

    /// Pause playback. Valid only from `Playing`.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> bool {
        let (handle, generation) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Playing || inner.pending {
                return false;
            }
            let Some(handle) = inner.handle.clone() else {
                return false;
            };
            inner.cancel_poller();
            inner.pending = true;
            (handle, inner.generation)
        };

        let result = handle.pause().await;

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return false;
            }
            inner.pending = false;
            match result {
                Ok(()) => {
                    inner.phase = Phase::Paused;
                    inner.state.is_playing = false;
                    inner.state.is_paused = true;
                    inner.state.clone()
                }
                Err(e) => {
                    error!(error = ?e, "Failed to pause playback");
                    inner.last_error = Some(e.kind());
                    inner.poller = Some(self.schedule_poller());
                    return false;
                }
            }
        };

        debug!(position_seconds = snapshot.position_seconds, "Playback paused");
        self.shared.observers.notify(&snapshot);
        true
    }

    /// Continue paused playback. Same as [`PlaybackSession::play`] from `Paused`.
    pub async fn resume(&self) -> bool {
        if self.lock().phase != Phase::Paused {
            return false;
        }
        self.play().await
    }

    /// Halt playback and release the asset. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> bool {
        let (handle, snapshot) = {
            let mut inner = self.lock();
            inner.cancel_poller();
            inner.generation += 1;
            inner.pending = false;
            let handle = inner.handle.take();
            if inner.phase == Phase::Unloaded && handle.is_none() {
                return true;
            }
            inner.phase = Phase::Unloaded;
            inner.state = PlaybackState::default();
            (handle, inner.state.clone())
        };

        self.shared.observers.notify(&snapshot);

        if let Some(handle) = handle {
            Self::release(handle).await;
            debug!("Playback stopped and asset released");
        }

        true
    }

    async fn release(handle: Arc<dyn PlaybackHandle>) {
        if let Err(e) = handle.stop().await {
            debug!(error = ?e, "Platform stop failed during release");
        }
        if let Err(e) = handle.unload().await {
            warn!(error = ?e, "Failed to unload playback asset");
        }
    }

    /// Move the playhead. The caller is responsible for keeping
    /// `position_seconds` within `0..=total_seconds`; negative or
    /// non-finite targets are refused.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, position_seconds: f64) -> bool {
        if !(position_seconds.is_finite() && position_seconds >= 0.0) {
            return false;
        }
        let Some((handle, generation)) = self.loaded_handle() else {
            return false;
        };

        let millis = (position_seconds * 1000.0).round() as u64;
        if let Err(e) = handle.set_position(millis).await {
            error!(error = ?e, "Failed to seek");
            self.lock().last_error = Some(e.kind());
            return false;
        }

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return false;
            }
            inner.state.position_seconds = position_seconds;
            inner.state.clone()
        };

        self.shared.observers.notify(&snapshot);
        true
    }

    /// Set output volume on the loaded asset.
    #[instrument(skip(self))]
    pub async fn set_volume(&self, volume: f32) -> bool {
        let Some((handle, _)) = self.loaded_handle() else {
            return false;
        };
        match handle.set_volume(volume).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Failed to set volume");
                false
            }
        }
    }

    /// Set playback speed on the loaded asset.
    #[instrument(skip(self))]
    pub async fn set_playback_rate(&self, rate: f32) -> bool {
        let Some((handle, _)) = self.loaded_handle() else {
            return false;
        };
        match handle.set_rate(rate).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Failed to set playback rate");
                false
            }
        }
    }

    fn loaded_handle(&self) -> Option<(Arc<dyn PlaybackHandle>, u64)> {
        let inner = self.lock();
        if !matches!(inner.phase, Phase::Loaded | Phase::Playing | Phase::Paused) {
            return None;
        }
        inner
            .handle
            .as_ref()
            .map(|handle| (Arc::clone(handle), inner.generation))
    }

    fn schedule_poller(&self) -> TickHandle {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let task: TickTask = Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(shared) = weak.upgrade() {
                    PlaybackSession { shared }.poll().await;
                }
            })
        });

        self.shared
            .context
            .scheduler
            .schedule(self.shared.options.poll_interval, task)
    }

    /// Take one status sample. Called by the poller while playing.
    ///
    /// Reaching the end of the asset is handled exactly like [`PlaybackSession::stop`].
    pub async fn poll(&self) {
        let (handle, generation) = {
            let inner = self.lock();
            if inner.phase != Phase::Playing || inner.pending {
                return;
            }
            let Some(handle) = inner.handle.clone() else {
                return;
            };
            (handle, inner.generation)
        };

        let status = match handle.status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = ?e, "Playback status unavailable");
                return;
            }
        };

        if status.did_just_finish || !status.is_loaded {
            if self.lock().generation != generation {
                return;
            }
            info!(
                finished = status.did_just_finish,
                "Playback ended, releasing asset"
            );
            self.stop().await;
            return;
        }

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.phase != Phase::Playing {
                return;
            }
            let before = (inner.state.position_seconds, inner.state.total_seconds);
            inner.state.position_seconds = millis_to_seconds(status.position_millis);
            if let Some(duration) = status.duration_millis {
                inner.state.total_seconds = millis_to_seconds(duration);
            }
            if before == (inner.state.position_seconds, inner.state.total_seconds) {
                return;
            }
            inner.state.clone()
        };

        trace!(position_seconds = snapshot.position_seconds, "Playback position");
        self.shared.observers.notify(&snapshot);
    }
}

fn millis_to_seconds(millis: u64) -> f64 {
    millis as f64 / 1000.0
}
