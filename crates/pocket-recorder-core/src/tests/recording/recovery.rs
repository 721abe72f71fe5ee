use crate::{
    KeyValueStore, MemoryStore, RecordingState, RecordingStatus, SESSION_STATE_KEY,
    tests::support::{Harness, collector},
};

use std::sync::Arc;

async fn store_with(raw: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    #[allow(clippy::unwrap_used)]
    store.set(SESSION_STATE_KEY, raw).await.unwrap();
    store
}

fn stale_recording() -> String {
    let state = RecordingState {
        is_recording: true,
        is_paused: false,
        duration_seconds: 42,
        active_file_ref: Some("memory://recordings/recording_old.m4a".to_string()),
        display_name: "Recording 2026-10-18 21:04:09".to_string(),
    };
    #[allow(clippy::unwrap_used)]
    serde_json::to_string(&state).unwrap()
}

/// WHAT: A persisted is_recording claim from a dead process is discarded
/// WHY: Recorder handles cannot survive a restart, so the claim is stale
#[tokio::test]
async fn given_stale_persisted_recording_when_recovering_then_reset_to_idle() {
    // Given: A store left behind by a process that died mid-recording
    let h = Harness::with_store(store_with(&stale_recording()).await);
    let (seen, observer) = collector::<RecordingState>();
    let _subscription = h.recording.subscribe(observer);

    // When: Recovering at launch
    let recovered = h.recording.recover().await;

    // Then: The session publishes and persists a clean Idle state
    assert!(recovered);
    assert_eq!(h.recording.status(), RecordingStatus::Idle);
    assert_eq!(h.persisted_state().await, Some(RecordingState::default()));
    assert_eq!(
        *seen.lock().unwrap_or_else(|e| e.into_inner()),
        vec![RecordingState::default()]
    );
}

/// WHAT: A persisted idle state needs no recovery
/// WHY: Clean shutdowns must not produce spurious notifications
#[tokio::test]
async fn given_persisted_idle_state_when_recovering_then_nothing_happens() {
    // Given: A store holding an idle snapshot
    #[allow(clippy::unwrap_used)]
    let idle = serde_json::to_string(&RecordingState::default()).unwrap();
    let h = Harness::with_store(store_with(&idle).await);

    // When: Recovering
    let recovered = h.recording.recover().await;

    // Then: No reset happened
    assert!(!recovered);
}

/// WHAT: First launch with an empty store needs no recovery
/// WHY: A missing key is the normal first-run case
#[tokio::test]
async fn given_empty_store_when_recovering_then_nothing_happens() {
    // Given: An empty store
    let h = Harness::new();

    // When/Then: Recovering is a no-op
    assert!(!h.recording.recover().await);
    assert_eq!(h.persisted_state().await, None);
}

/// WHAT: An unreadable persisted state is logged and ignored
/// WHY: A corrupt snapshot must not block the app from launching
#[tokio::test]
async fn given_corrupt_persisted_state_when_recovering_then_ignored() {
    // Given: Garbage under the session state key
    let h = Harness::with_store(store_with("{not json").await);

    // When/Then: Recovery declines and the session is usable
    assert!(!h.recording.recover().await);
    assert!(h.recording.start().await);
}

/// WHAT: Recovery never tears down a live recording
/// WHY: The claim is only stale when no recorder handle exists
#[tokio::test]
async fn given_live_recording_when_recovering_then_recording_continues() {
    // Given: A recording in progress, which persists is_recording = true
    let h = Harness::new();
    assert!(h.recording.start().await);

    // When: Recovering
    let recovered = h.recording.recover().await;

    // Then: Nothing was reset
    assert!(!recovered);
    assert_eq!(h.recording.status(), RecordingStatus::Recording);
}
