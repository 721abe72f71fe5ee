//! Recording state machine: `Idle -> Recording <-> Paused -> Idle`.
//!
//! Every operation checks its guard against the state current at the moment
//! it runs and claims the transition before awaiting the platform, so an
//! overlapping second call (a double tap on stop, say) fails
//! deterministically instead of racing the first one.

use crate::{
    CoreResult, ErrorKind, SessionError,
    platform::{AudioMode, MediaLibrary, RecordingHandle, RecordingPrimitive},
    recording::{
        RecordingOptions, RecordingState, RecordingStatus,
        naming::{IdGenerator, recording_display_name, recording_file_name},
    },
    runtime::{Observers, SessionContext, Subscription, TickHandle, TickTask},
    storage::{RecordingCatalog, SavedRecording},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Store key of the persisted [`RecordingState`] snapshot.
pub const SESSION_STATE_KEY: &str = "recording_session_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Starting,
    Recording,
    Paused,
    Stopping,
}

/// Timing and ownership that never leave the session.
struct Inner {
    phase: Phase,
    state: RecordingState,
    handle: Option<Arc<dyn RecordingHandle>>,
    started_at: Duration,
    paused_total: Duration,
    paused_at: Option<Duration>,
    ticker: Option<TickHandle>,
    generation: u64,
    session_id: Option<Uuid>,
    last_error: Option<ErrorKind>,
}

impl Inner {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            state: RecordingState::default(),
            handle: None,
            started_at: Duration::ZERO,
            paused_total: Duration::ZERO,
            paused_at: None,
            ticker: None,
            generation: 0,
            session_id: None,
            last_error: None,
        }
    }

    /// Active recording time: start to now, minus every paused interval.
    fn active_elapsed(&self, now: Duration) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_sub(self.started_at)
            .saturating_sub(self.paused_total)
    }

    /// Refresh `duration_seconds`, never letting it go backwards.
    fn refresh_duration(&mut self, now: Duration) -> bool {
        let seconds = self.active_elapsed(now).as_secs().max(self.state.duration_seconds);
        let changed = seconds != self.state.duration_seconds;
        self.state.duration_seconds = seconds;
        changed
    }

    fn cancel_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn reset(&mut self) {
        self.cancel_ticker();
        self.phase = Phase::Idle;
        self.state = RecordingState::default();
        self.handle = None;
        self.started_at = Duration::ZERO;
        self.paused_total = Duration::ZERO;
        self.paused_at = None;
        self.session_id = None;
    }
}

struct Shared {
    primitive: Arc<dyn RecordingPrimitive>,
    catalog: RecordingCatalog,
    context: SessionContext,
    options: RecordingOptions,
    media_library: Mutex<Option<Arc<dyn MediaLibrary>>>,
    ids: IdGenerator,
    observers: Observers<RecordingState>,
    inner: Mutex<Inner>,
}

/// The single live recording session.
///
/// Construct one at the application root and hand clones to consumers;
/// clones share the same state machine.
#[derive(Clone)]
pub struct RecordingSession {
    shared: Arc<Shared>,
}

impl RecordingSession {
    /// Create an idle session.
    pub fn new(
        primitive: Arc<dyn RecordingPrimitive>,
        catalog: RecordingCatalog,
        context: SessionContext,
        options: RecordingOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                primitive,
                catalog,
                context,
                options,
                media_library: Mutex::new(None),
                ids: IdGenerator::default(),
                observers: Observers::new(),
                inner: Mutex::new(Inner::new()),
            }),
        }
    }

    /// Copy every finished recording into `library` as well.
    pub fn set_media_library(&self, library: Arc<dyn MediaLibrary>) {
        *self
            .shared
            .media_library
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(library);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now(&self) -> Duration {
        self.shared.context.clock.monotonic()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> RecordingState {
        self.lock().state.clone()
    }

    /// Current state machine position.
    pub fn status(&self) -> RecordingStatus {
        self.lock().state.status()
    }

    /// Kind of the most recent failure, cleared by the next successful start.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.lock().last_error
    }

    /// Observe every state change. Delivery is synchronous, in
    /// subscription order.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&RecordingState) + Send + Sync + 'static,
    {
        self.shared.observers.subscribe(observer)
    }

    /// Begin a new recording. Valid only from `Idle`.
    ///
    /// Returns `false` on a guard violation or on any platform failure; the
    /// failure kind is logged and kept in [`RecordingSession::last_error`].
    #[instrument(skip(self))]
    pub async fn start(&self) -> bool {
        let (generation, session_id) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Idle {
                return false;
            }
            inner.phase = Phase::Starting;
            inner.generation += 1;
            let session_id = Uuid::new_v4();
            inner.session_id = Some(session_id);
            (inner.generation, session_id)
        };

        let started_wall = self.shared.context.clock.wall();
        let file_name = recording_file_name(started_wall, &self.shared.options.file_extension);

        let handle = match self.open_recorder(&file_name).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(session_id = %session_id, error = ?e, kind = ?e.kind(), "Failed to start recording");
                let mut inner = self.lock();
                inner.last_error = Some(e.kind());
                if inner.generation == generation {
                    inner.reset();
                }
                return false;
            }
        };

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.phase != Phase::Starting {
                None
            } else {
                inner.phase = Phase::Recording;
                inner.started_at = self.now();
                inner.paused_total = Duration::ZERO;
                inner.paused_at = None;
                inner.state = RecordingState {
                    is_recording: true,
                    is_paused: false,
                    duration_seconds: 0,
                    active_file_ref: handle.file_uri(),
                    display_name: recording_display_name(started_wall),
                };
                inner.handle = Some(Arc::clone(&handle));
                inner.ticker = Some(self.schedule_ticker());
                inner.last_error = None;
                Some(inner.state.clone())
            }
        };

        let Some(snapshot) = snapshot else {
            warn!(session_id = %session_id, "Session reset while starting, releasing recorder");
            if let Err(e) = handle.stop_and_unload().await {
                debug!(error = ?e, "Release of orphaned recorder failed");
            }
            return false;
        };

        info!(
            session_id = %session_id,
            file = ?snapshot.active_file_ref,
            "Recording started"
        );

        self.publish(&snapshot).await;
        true
    }

    /// Permission, audio mode, then a recorder handle with bounded retries.
    async fn open_recorder(&self, file_name: &str) -> CoreResult<Arc<dyn RecordingHandle>> {
        if !self.shared.primitive.request_permission().await? {
            return Err(SessionError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.apply_audio_mode().await?;

        let max_attempts = self.shared.options.max_start_retries + 1;
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            match self.prepare_fresh_handle(file_name).await {
                Ok(handle) => {
                    if attempt > 1 {
                        info!(attempt, "Recorder started after reset");
                    }
                    return Ok(handle);
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = ?e, "Recorder failed to start, resetting handle");
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure
            .unwrap_or_else(|| SessionError::primitive("prepare", "no start attempts were made")))
    }

    async fn apply_audio_mode(&self) -> CoreResult<()> {
        let primary = AudioMode::primary();
        let Err(primary_error) = self.shared.primitive.set_audio_mode(&primary).await else {
            return Ok(());
        };

        warn!(error = ?primary_error, "Primary audio mode rejected, trying minimal mode");

        self.shared
            .primitive
            .set_audio_mode(&AudioMode::fallback())
            .await
            .map_err(|e| SessionError::DeviceConfig {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn prepare_fresh_handle(&self, file_name: &str) -> CoreResult<Arc<dyn RecordingHandle>> {
        let handle = self.shared.primitive.create_recording(file_name).await?;

        let started = match handle.prepare().await {
            Ok(()) => handle.start().await,
            Err(e) => Err(e),
        };

        if let Err(e) = started {
            if let Err(release_error) = handle.stop_and_unload().await {
                debug!(error = ?release_error, "Release of failed recorder handle failed");
            }
            return Err(e);
        }

        Ok(handle)
    }

    fn schedule_ticker(&self) -> TickHandle {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let task: TickTask = Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(shared) = weak.upgrade() {
                    RecordingSession { shared }.tick();
                }
            })
        });

        self.shared
            .context
            .scheduler
            .schedule(self.shared.options.tick_interval, task)
    }

    /// Recompute `duration_seconds` from the clock. Called by the ticker;
    /// does nothing unless actively recording.
    pub fn tick(&self) {
        let snapshot = {
            let mut inner = self.lock();
            if inner.phase != Phase::Recording {
                return;
            }
            let now = self.now();
            if !inner.refresh_duration(now) {
                return;
            }
            inner.state.clone()
        };

        trace!(duration_seconds = snapshot.duration_seconds, "Recording tick");
        self.shared.observers.notify(&snapshot);
    }

    /// Pause capture. Valid only from `Recording`.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> bool {
        let (handle, generation) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Recording {
                return false;
            }
            let Some(handle) = inner.handle.clone() else {
                return false;
            };
            inner.cancel_ticker();
            let now = self.now();
            inner.refresh_duration(now);
            inner.paused_at = Some(now);
            inner.phase = Phase::Paused;
            inner.state.is_paused = true;
            (handle, inner.generation)
        };

        match handle.pause().await {
            Ok(()) => {
                let snapshot = {
                    let inner = self.lock();
                    (inner.generation == generation && inner.phase == Phase::Paused)
                        .then(|| inner.state.clone())
                };
                if let Some(snapshot) = snapshot {
                    info!(duration_seconds = snapshot.duration_seconds, "Recording paused");
                    self.publish(&snapshot).await;
                }
                true
            }
            Err(e) => {
                error!(error = ?e, "Failed to pause recording");
                let mut inner = self.lock();
                inner.last_error = Some(e.kind());
                if inner.generation == generation && inner.phase == Phase::Paused {
                    // The recorder kept capturing, so the interval counts as active.
                    inner.paused_at = None;
                    inner.phase = Phase::Recording;
                    inner.state.is_paused = false;
                    inner.ticker = Some(self.schedule_ticker());
                }
                false
            }
        }
    }

    /// Continue capture. Valid only from `Paused`.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> bool {
        let (handle, generation, paused_at, resumed_at, frozen_seconds) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Paused {
                return false;
            }
            let (Some(handle), Some(paused_at)) = (inner.handle.clone(), inner.paused_at) else {
                return false;
            };
            let now = self.now();
            inner.paused_total += now.saturating_sub(paused_at);
            inner.paused_at = None;
            inner.phase = Phase::Recording;
            inner.state.is_paused = false;
            inner.ticker = Some(self.schedule_ticker());
            (
                handle,
                inner.generation,
                paused_at,
                now,
                inner.state.duration_seconds,
            )
        };

        match handle.start().await {
            Ok(()) => {
                let snapshot = {
                    let inner = self.lock();
                    (inner.generation == generation && inner.phase == Phase::Recording)
                        .then(|| inner.state.clone())
                };
                if let Some(snapshot) = snapshot {
                    info!(duration_seconds = snapshot.duration_seconds, "Recording resumed");
                    self.publish(&snapshot).await;
                }
                true
            }
            Err(e) => {
                error!(error = ?e, "Failed to resume recording");
                let mut inner = self.lock();
                inner.last_error = Some(e.kind());
                if inner.generation == generation && inner.phase == Phase::Recording {
                    inner.cancel_ticker();
                    // Undo exactly what was credited; the failed call itself counts as paused.
                    let credited = resumed_at.saturating_sub(paused_at);
                    inner.paused_total = inner.paused_total.saturating_sub(credited);
                    inner.paused_at = Some(paused_at);
                    inner.phase = Phase::Paused;
                    inner.state.is_paused = true;
                    inner.state.duration_seconds = frozen_seconds;
                }
                false
            }
        }
    }

    /// Finish the recording and add it to the catalog. Valid from
    /// `Recording` or `Paused`.
    ///
    /// The session is back in `Idle` when this returns, whether or not the
    /// platform managed to finalize the file.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Option<SavedRecording> {
        let (handle, final_state, generation, session_id) = {
            let mut inner = self.lock();
            if !matches!(inner.phase, Phase::Recording | Phase::Paused) {
                return None;
            }
            inner.cancel_ticker();
            let now = self.now();
            inner.refresh_duration(now);
            inner.phase = Phase::Stopping;
            (
                inner.handle.take(),
                inner.state.clone(),
                inner.generation,
                inner.session_id,
            )
        };

        let result = self.finalize(handle, &final_state).await;

        let snapshot = {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner.reset();
            }
            if let Err(e) = &result {
                inner.last_error = Some(e.kind());
            }
            inner.state.clone()
        };
        self.publish(&snapshot).await;

        match result {
            Ok(recording) => {
                info!(
                    session_id = ?session_id,
                    id = %recording.id,
                    duration_seconds = recording.duration_seconds,
                    "Recording saved"
                );
                self.copy_to_media_library(&recording).await;
                Some(recording)
            }
            Err(e) => {
                error!(session_id = ?session_id, error = ?e, kind = ?e.kind(), "Failed to stop recording");
                None
            }
        }
    }

    async fn finalize(
        &self,
        handle: Option<Arc<dyn RecordingHandle>>,
        state: &RecordingState,
    ) -> CoreResult<SavedRecording> {
        let handle =
            handle.ok_or_else(|| SessionError::primitive("stop", "no live recorder handle"))?;

        handle.stop_and_unload().await?;

        let file_uri = handle
            .file_uri()
            .or_else(|| state.active_file_ref.clone())
            .ok_or_else(|| SessionError::primitive("get_file_uri", "recorder reported no file"))?;

        let created_at = self.shared.context.clock.wall();
        let recording = SavedRecording {
            id: self.shared.ids.next(created_at),
            name: state.display_name.clone(),
            file_uri,
            duration_seconds: state.duration_seconds,
            created_at,
        };

        self.shared.catalog.append(recording.clone()).await?;

        Ok(recording)
    }

    async fn copy_to_media_library(&self, recording: &SavedRecording) {
        let library = self
            .shared
            .media_library
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        if let Some(library) = library
            && let Err(e) = library.save(&recording.file_uri).await
        {
            warn!(id = %recording.id, error = ?e, "Could not copy recording to media library");
        }
    }

    /// Discard a persisted `is_recording` claim left by a previous process.
    ///
    /// Recorder handles cannot survive a restart, so a claim without a live
    /// handle is stale. Returns whether a reset happened.
    #[instrument(skip(self))]
    pub async fn recover(&self) -> bool {
        let persisted = match self.load_persisted_state().await {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = ?e, "Could not read persisted recording state");
                return false;
            }
        };

        let Some(persisted) = persisted else {
            return false;
        };
        if !persisted.is_recording {
            return false;
        }

        let snapshot = {
            let mut inner = self.lock();
            if inner.handle.is_some() {
                return false;
            }
            inner.generation += 1;
            inner.reset();
            inner.state.clone()
        };

        warn!(
            file = ?persisted.active_file_ref,
            duration_seconds = persisted.duration_seconds,
            "Discarding stale recording from a previous run"
        );

        self.publish(&snapshot).await;
        true
    }

    /// Remove a finished recording from the catalog.
    #[instrument(skip(self))]
    pub async fn delete_recording(&self, id: &str) -> bool {
        match self.shared.catalog.remove_by_id(id).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = ?e, "Failed to delete recording");
                false
            }
        }
    }

    /// All finished recordings, oldest first. Empty if the catalog is unreadable.
    pub async fn list_recordings(&self) -> Vec<SavedRecording> {
        match self.shared.catalog.get_all().await {
            Ok(all) => all,
            Err(e) => {
                error!(error = ?e, "Failed to read recording catalog");
                Vec::new()
            }
        }
    }

    async fn load_persisted_state(&self) -> CoreResult<Option<RecordingState>> {
        match self.shared.context.store.get(SESSION_STATE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persist then notify. Persistence failures are logged only.
    async fn publish(&self, snapshot: &RecordingState) {
        let persisted = match serde_json::to_string(snapshot) {
            Ok(raw) => self.shared.context.store.set(SESSION_STATE_KEY, &raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = persisted {
            warn!(error = ?e, "Could not persist recording state");
        }

        self.shared.observers.notify(snapshot);
    }
}
