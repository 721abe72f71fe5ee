use crate::{
    KeyValueStore, ManualClock, ManualScheduler, MemoryStore, PlaybackOptions, PlaybackSession,
    RecordingCatalog, RecordingOptions, RecordingSession, RecordingState, SavedRecording,
    SessionContext, SimulatedPlatform,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};

pub(crate) const ONE_SECOND: Duration = Duration::from_secs(1);

/// Fixed wall-clock origin for every test.
pub(crate) fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 15)
        .single()
        .unwrap_or_default()
}

/// Deterministic wiring of both sessions over simulated collaborators.
pub(crate) struct Harness {
    pub clock: Arc<ManualClock>,
    pub scheduler: ManualScheduler,
    pub store: Arc<MemoryStore>,
    pub platform: SimulatedPlatform,
    pub catalog: RecordingCatalog,
    pub recording: RecordingSession,
    pub playback: PlaybackSession,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub(crate) fn with_store(store: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(ManualClock::starting_at(test_epoch()));
        let scheduler = ManualScheduler::new();
        let context = SessionContext {
            clock: clock.clone(),
            scheduler: Arc::new(scheduler.clone()),
            store: store.clone(),
        };
        let platform = SimulatedPlatform::new(clock.clone());
        let catalog = RecordingCatalog::new(store.clone());

        let recording = RecordingSession::new(
            Arc::new(platform.clone()),
            catalog.clone(),
            context.clone(),
            RecordingOptions::default(),
        );
        let playback = PlaybackSession::new(
            Arc::new(platform.clone()),
            context,
            PlaybackOptions::default(),
        );

        Self {
            clock,
            scheduler,
            store,
            platform,
            catalog,
            recording,
            playback,
        }
    }

    /// Advance one second and run every live ticker, `n` times.
    pub(crate) async fn tick_seconds(&self, n: usize) {
        for _ in 0..n {
            self.clock.advance(ONE_SECOND);
            self.scheduler.fire().await;
        }
    }

    /// Register a playable asset and return a matching catalog entry.
    pub(crate) fn asset(&self, id: &str, seconds: u64) -> SavedRecording {
        let file_uri = format!("memory://assets/{id}.m4a");
        self.platform
            .register_asset(file_uri.clone(), Duration::from_secs(seconds));
        SavedRecording {
            id: id.to_string(),
            name: format!("Asset {id}"),
            file_uri,
            duration_seconds: seconds,
            created_at: test_epoch(),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) async fn persisted_state(&self) -> Option<RecordingState> {
        self.store
            .get(crate::SESSION_STATE_KEY)
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

/// Collects every value an observer receives.
pub(crate) fn collector<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static)
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value: &T| {
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(value.clone())
    })
}
