//! In-process stand-in for the platform audio primitives.
//!
//! Recording and playback advance against an injected [`Clock`], so a
//! [`ManualClock`](crate::ManualClock) makes every run reproducible. Faults
//! can be injected per operation to exercise the sessions' recovery paths.

use crate::{
    CoreResult, SessionError,
    platform::{
        AudioMode, PlaybackHandle, PlaybackPrimitive, PlaybackStatus, RecordingHandle,
        RecordingPrimitive,
    },
    runtime::Clock,
};

use std::{
    collections::HashMap,
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, warn};

#[derive(Default)]
struct Faults {
    deny_permission: AtomicBool,
    reject_primary_mode: AtomicBool,
    reject_fallback_mode: AtomicBool,
    prepare_failures: AtomicU32,
    fail_stop: AtomicBool,
    fail_pause: AtomicBool,
    fail_resume: AtomicBool,
    fail_load: AtomicBool,
    withhold_duration: AtomicBool,
}

#[derive(Default)]
struct Counters {
    permission_requests: AtomicUsize,
    recordings_created: AtomicUsize,
    recordings_released: AtomicUsize,
    prepare_attempts: AtomicUsize,
    players_loaded: AtomicUsize,
    live_players: AtomicUsize,
}

struct Shared {
    clock: Arc<dyn Clock>,
    output_dir: Option<PathBuf>,
    faults: Faults,
    counters: Counters,
    assets: Mutex<HashMap<String, u64>>,
    applied_modes: Mutex<Vec<AudioMode>>,
    volume: Mutex<Option<f32>>,
}

/// Simulated recorder and player sharing one asset table.
///
/// A stopped recording is registered as a playable asset whose duration is
/// the time it spent capturing.
#[derive(Clone)]
pub struct SimulatedPlatform {
    shared: Arc<Shared>,
}

impl SimulatedPlatform {
    /// Create a platform whose file URIs are in-memory only.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::build(clock, None)
    }

    /// Create a platform that writes a placeholder file per recording into `dir`.
    pub fn with_output_dir(clock: Arc<dyn Clock>, dir: impl Into<PathBuf>) -> Self {
        Self::build(clock, Some(dir.into()))
    }

    fn build(clock: Arc<dyn Clock>, output_dir: Option<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                output_dir,
                faults: Faults::default(),
                counters: Counters::default(),
                assets: Mutex::new(HashMap::new()),
                applied_modes: Mutex::new(Vec::new()),
                volume: Mutex::new(None),
            }),
        }
    }

    /// Make `uri` loadable with the given decoded duration.
    pub fn register_asset(&self, uri: impl Into<String>, duration: Duration) {
        self.shared
            .assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri.into(), duration.as_millis() as u64);
    }

    /// Decoded duration of a registered asset.
    pub fn asset_duration(&self, uri: &str) -> Option<Duration> {
        self.shared
            .assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(uri)
            .map(|ms| Duration::from_millis(*ms))
    }

    /// Answer permission requests with a denial.
    pub fn deny_permission(&self, deny: bool) {
        self.shared.faults.deny_permission.store(deny, Ordering::SeqCst);
    }

    /// Reject the primary and/or fallback audio mode.
    pub fn reject_audio_mode(&self, primary: bool, fallback: bool) {
        self.shared.faults.reject_primary_mode.store(primary, Ordering::SeqCst);
        self.shared.faults.reject_fallback_mode.store(fallback, Ordering::SeqCst);
    }

    /// Fail the next `count` prepare calls.
    pub fn fail_next_prepares(&self, count: u32) {
        self.shared.faults.prepare_failures.store(count, Ordering::SeqCst);
    }

    /// Fail every recording stop.
    pub fn fail_stop(&self, fail: bool) {
        self.shared.faults.fail_stop.store(fail, Ordering::SeqCst);
    }

    /// Fail every recording and playback pause.
    pub fn fail_pause(&self, fail: bool) {
        self.shared.faults.fail_pause.store(fail, Ordering::SeqCst);
    }

    /// Fail every recording start after the first, so capture cannot continue
    /// after a pause.
    pub fn fail_resume(&self, fail: bool) {
        self.shared.faults.fail_resume.store(fail, Ordering::SeqCst);
    }

    /// Fail every playback load.
    pub fn fail_load(&self, fail: bool) {
        self.shared.faults.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Report no decoded duration from playback status.
    pub fn withhold_duration(&self, withhold: bool) {
        self.shared.faults.withhold_duration.store(withhold, Ordering::SeqCst);
    }

    /// Number of permission prompts shown.
    pub fn permission_requests(&self) -> usize {
        self.shared.counters.permission_requests.load(Ordering::SeqCst)
    }

    /// Recording handles created so far.
    pub fn recordings_created(&self) -> usize {
        self.shared.counters.recordings_created.load(Ordering::SeqCst)
    }

    /// Recording handles released so far.
    pub fn recordings_released(&self) -> usize {
        self.shared.counters.recordings_released.load(Ordering::SeqCst)
    }

    /// Prepare calls made so far, including failed ones.
    pub fn prepare_attempts(&self) -> usize {
        self.shared.counters.prepare_attempts.load(Ordering::SeqCst)
    }

    /// Playback handles loaded so far.
    pub fn players_loaded(&self) -> usize {
        self.shared.counters.players_loaded.load(Ordering::SeqCst)
    }

    /// Playback handles currently loaded.
    pub fn live_players(&self) -> usize {
        self.shared.counters.live_players.load(Ordering::SeqCst)
    }

    /// Audio modes accepted by the platform, oldest first.
    pub fn applied_modes(&self) -> Vec<AudioMode> {
        self.shared
            .applied_modes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Volume most recently applied to any player.
    pub fn volume(&self) -> Option<f32> {
        *self.shared.volume.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn uri_for(&self, file_name: &str) -> String {
        match &self.shared.output_dir {
            Some(dir) => dir.join(file_name).display().to_string(),
            None => format!("memory://recordings/{file_name}"),
        }
    }
}

#[async_trait]
impl RecordingPrimitive for SimulatedPlatform {
    async fn request_permission(&self) -> CoreResult<bool> {
        self.shared
            .counters
            .permission_requests
            .fetch_add(1, Ordering::SeqCst);
        Ok(!self.shared.faults.deny_permission.load(Ordering::SeqCst))
    }

    async fn set_audio_mode(&self, mode: &AudioMode) -> CoreResult<()> {
        let faults = &self.shared.faults;
        let rejected = (*mode == AudioMode::primary()
            && faults.reject_primary_mode.load(Ordering::SeqCst))
            || (*mode == AudioMode::fallback()
                && faults.reject_fallback_mode.load(Ordering::SeqCst));

        if rejected {
            return Err(SessionError::primitive(
                "set_audio_mode",
                "audio mode not supported",
            ));
        }

        self.shared
            .applied_modes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*mode);
        Ok(())
    }

    async fn create_recording(&self, file_name: &str) -> CoreResult<Arc<dyn RecordingHandle>> {
        self.shared
            .counters
            .recordings_created
            .fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(SimulatedRecording {
            uri: self.uri_for(file_name),
            platform: self.clone(),
            state: Mutex::new(RecordingProgress::default()),
        }))
    }
}

#[derive(Default)]
struct RecordingProgress {
    prepared: bool,
    started: bool,
    released: bool,
    captured: Duration,
    capturing_since: Option<Duration>,
}

struct SimulatedRecording {
    uri: String,
    platform: SimulatedPlatform,
    state: Mutex<RecordingProgress>,
}

impl SimulatedRecording {
    fn progress(&self) -> std::sync::MutexGuard<'_, RecordingProgress> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now(&self) -> Duration {
        self.platform.shared.clock.monotonic()
    }
}

#[async_trait]
impl RecordingHandle for SimulatedRecording {
    async fn prepare(&self) -> CoreResult<()> {
        let shared = &self.platform.shared;
        shared.counters.prepare_attempts.fetch_add(1, Ordering::SeqCst);

        let failed = shared
            .faults
            .prepare_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(SessionError::primitive("prepare", "recorder not ready"));
        }

        let mut progress = self.progress();
        if progress.released {
            return Err(SessionError::primitive("prepare", "recorder already released"));
        }
        progress.prepared = true;
        Ok(())
    }

    async fn start(&self) -> CoreResult<()> {
        let now = self.now();
        let mut progress = self.progress();
        if !progress.prepared || progress.released {
            return Err(SessionError::primitive("start", "recorder not prepared"));
        }
        if progress.started && self.platform.shared.faults.fail_resume.load(Ordering::SeqCst) {
            return Err(SessionError::primitive("start", "recorder could not resume"));
        }
        progress.started = true;
        if progress.capturing_since.is_none() {
            progress.capturing_since = Some(now);
        }
        Ok(())
    }

    async fn pause(&self) -> CoreResult<()> {
        if self.platform.shared.faults.fail_pause.load(Ordering::SeqCst) {
            return Err(SessionError::primitive("pause", "recorder busy"));
        }

        let now = self.now();
        let mut progress = self.progress();
        match progress.capturing_since.take() {
            Some(since) => {
                progress.captured += now.saturating_sub(since);
                Ok(())
            }
            None => Err(SessionError::primitive("pause", "recorder not capturing")),
        }
    }

    async fn stop_and_unload(&self) -> CoreResult<()> {
        let now = self.now();
        let captured = {
            let mut progress = self.progress();
            if progress.released {
                return Err(SessionError::primitive("stop", "recorder already released"));
            }
            progress.released = true;
            if let Some(since) = progress.capturing_since.take() {
                progress.captured += now.saturating_sub(since);
            }
            progress.captured
        };

        let shared = &self.platform.shared;
        shared
            .counters
            .recordings_released
            .fetch_add(1, Ordering::SeqCst);

        if shared.faults.fail_stop.load(Ordering::SeqCst) {
            return Err(SessionError::primitive("stop", "recorder failed to finalize"));
        }

        if shared.output_dir.is_some() {
            tokio::fs::write(&self.uri, b"")
                .await
                .map_err(|e| SessionError::primitive("stop", e))?;
        }

        self.platform.register_asset(self.uri.clone(), captured);
        debug!(uri = %self.uri, captured_ms = captured.as_millis(), "Simulated recording finalized");

        Ok(())
    }

    fn file_uri(&self) -> Option<String> {
        Some(self.uri.clone())
    }
}

#[async_trait]
impl PlaybackPrimitive for SimulatedPlatform {
    async fn create_and_load(
        &self,
        uri: &str,
        autoplay: bool,
    ) -> CoreResult<Arc<dyn PlaybackHandle>> {
        if self.shared.faults.fail_load.load(Ordering::SeqCst) {
            return Err(SessionError::Load {
                uri: uri.to_string(),
                reason: "decoder unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let duration = self.asset_duration(uri).ok_or_else(|| SessionError::Load {
            uri: uri.to_string(),
            reason: "no such asset".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let counters = &self.shared.counters;
        counters.players_loaded.fetch_add(1, Ordering::SeqCst);
        counters.live_players.fetch_add(1, Ordering::SeqCst);

        let player = SimulatedPlayer {
            platform: self.clone(),
            duration_ms: duration.as_millis() as u64,
            state: Mutex::new(PlayerProgress {
                rate: 1.0,
                ..PlayerProgress::default()
            }),
        };

        if autoplay {
            player.play().await?;
        }

        Ok(Arc::new(player))
    }
}

#[derive(Default)]
struct PlayerProgress {
    unloaded: bool,
    position_ms: u64,
    playing_since: Option<Duration>,
    finish_reported: bool,
    rate: f32,
}

struct SimulatedPlayer {
    platform: SimulatedPlatform,
    duration_ms: u64,
    state: Mutex<PlayerProgress>,
}

impl SimulatedPlayer {
    fn progress(&self) -> std::sync::MutexGuard<'_, PlayerProgress> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now(&self) -> Duration {
        self.platform.shared.clock.monotonic()
    }

    /// Fold elapsed play time into `position_ms`, re-anchoring at `now`.
    fn settle(&self, progress: &mut PlayerProgress, now: Duration) {
        if let Some(since) = progress.playing_since {
            let elapsed = now.saturating_sub(since).as_millis() as f64 * f64::from(progress.rate);
            progress.position_ms = (progress.position_ms + elapsed as u64).min(self.duration_ms);
            progress.playing_since = Some(now);
        }
    }

    fn ensure_loaded(progress: &PlayerProgress, operation: &'static str) -> CoreResult<()> {
        if progress.unloaded {
            return Err(SessionError::primitive(operation, "asset unloaded"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackHandle for SimulatedPlayer {
    async fn play(&self) -> CoreResult<()> {
        let now = self.now();
        let mut progress = self.progress();
        Self::ensure_loaded(&progress, "play")?;
        if progress.position_ms >= self.duration_ms {
            progress.position_ms = 0;
        }
        if progress.playing_since.is_none() {
            progress.playing_since = Some(now);
            progress.finish_reported = false;
        }
        Ok(())
    }

    async fn pause(&self) -> CoreResult<()> {
        if self.platform.shared.faults.fail_pause.load(Ordering::SeqCst) {
            return Err(SessionError::primitive("pause", "player busy"));
        }
        let now = self.now();
        let mut progress = self.progress();
        Self::ensure_loaded(&progress, "pause")?;
        self.settle(&mut progress, now);
        progress.playing_since = None;
        Ok(())
    }

    async fn stop(&self) -> CoreResult<()> {
        let mut progress = self.progress();
        Self::ensure_loaded(&progress, "stop")?;
        progress.playing_since = None;
        progress.position_ms = 0;
        Ok(())
    }

    async fn unload(&self) -> CoreResult<()> {
        let mut progress = self.progress();
        if progress.unloaded {
            warn!("Simulated player unloaded twice");
            return Ok(());
        }
        progress.unloaded = true;
        progress.playing_since = None;
        self.platform
            .shared
            .counters
            .live_players
            .fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_position(&self, millis: u64) -> CoreResult<()> {
        let now = self.now();
        let mut progress = self.progress();
        Self::ensure_loaded(&progress, "set_position")?;
        progress.position_ms = millis.min(self.duration_ms);
        if progress.playing_since.is_some() {
            progress.playing_since = Some(now);
        }
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> CoreResult<()> {
        let progress = self.progress();
        Self::ensure_loaded(&progress, "set_volume")?;
        *self
            .platform
            .shared
            .volume
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(volume);
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> CoreResult<()> {
        let now = self.now();
        let mut progress = self.progress();
        Self::ensure_loaded(&progress, "set_rate")?;
        self.settle(&mut progress, now);
        progress.rate = rate;
        Ok(())
    }

    async fn status(&self) -> CoreResult<PlaybackStatus> {
        let now = self.now();
        let mut progress = self.progress();
        if progress.unloaded {
            return Ok(PlaybackStatus::default());
        }

        self.settle(&mut progress, now);

        let mut did_just_finish = false;
        if progress.playing_since.is_some() && progress.position_ms >= self.duration_ms {
            progress.playing_since = None;
            if !progress.finish_reported {
                progress.finish_reported = true;
                did_just_finish = true;
            }
        }

        let duration_millis = if self
            .platform
            .shared
            .faults
            .withhold_duration
            .load(Ordering::SeqCst)
        {
            None
        } else {
            Some(self.duration_ms)
        };

        Ok(PlaybackStatus {
            is_loaded: true,
            position_millis: progress.position_ms,
            duration_millis,
            did_just_finish,
        })
    }
}
