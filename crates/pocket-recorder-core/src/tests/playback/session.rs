use crate::{
    ErrorKind, PlaybackState, PlayerStatus,
    tests::support::{Harness, collector},
};

use std::time::Duration;

/// WHAT: Loading takes the total length from the decoded asset
/// WHY: The decoder is authoritative over the catalog's rounded duration
#[tokio::test]
async fn given_registered_asset_when_loading_then_loaded_with_decoded_total() {
    // Given: A 12 second asset
    let h = Harness::new();
    let recording = h.asset("a", 12);

    // When: Loading it
    let loaded = h.playback.load(recording.clone()).await;

    // Then: Loaded, stopped at zero, one live player
    assert!(loaded);
    let state = h.playback.snapshot();
    assert_eq!(state.status(), PlayerStatus::Loaded);
    assert_eq!(state.total_seconds, 12.0);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.loaded_recording, Some(recording));
    assert_eq!(h.playback.loaded_id().as_deref(), Some("a"));
    assert_eq!(h.platform.live_players(), 1);
}

/// WHAT: Without a decoded duration the catalog duration is used
/// WHY: Some containers report no length until playback begins
#[tokio::test]
async fn given_undecoded_duration_when_loading_then_catalog_duration_used() {
    // Given: An asset whose status omits the duration
    let h = Harness::new();
    let mut recording = h.asset("a", 12);
    recording.duration_seconds = 7;
    h.platform.withhold_duration(true);

    // When: Loading it
    assert!(h.playback.load(recording).await);

    // Then: The catalog value stands in
    assert_eq!(h.playback.snapshot().total_seconds, 7.0);
}

/// WHAT: A missing file fails load with LoadError
/// WHY: A catalog entry can outlive its file
#[tokio::test]
async fn given_unknown_asset_when_loading_then_unloaded_with_load_error() {
    // Given: A catalog entry with no file behind it
    let h = Harness::new();
    let mut recording = h.asset("a", 5);
    recording.file_uri = "memory://assets/missing.m4a".to_string();

    // When: Loading it
    let loaded = h.playback.load(recording).await;

    // Then: Nothing is loaded and the failure is retryable
    assert!(!loaded);
    assert_eq!(h.playback.status(), PlayerStatus::Unloaded);
    assert_eq!(h.playback.last_error(), Some(ErrorKind::LoadError));
    assert_eq!(h.platform.live_players(), 0);
}

/// WHAT: Loading a second recording releases the first
/// WHY: At most one platform player may be alive at a time
#[tokio::test]
async fn given_playing_asset_when_loading_another_then_previous_released() {
    // Given: Asset a playing
    let h = Harness::new();
    let a = h.asset("a", 10);
    let b = h.asset("b", 20);
    assert!(h.playback.load(a).await);
    assert!(h.playback.play().await);

    // When: Loading b
    assert!(h.playback.load(b).await);

    // Then: Only b is alive, loaded but not playing, with no poller
    assert_eq!(h.platform.players_loaded(), 2);
    assert_eq!(h.platform.live_players(), 1);
    assert_eq!(h.playback.loaded_id().as_deref(), Some("b"));
    assert_eq!(h.playback.status(), PlayerStatus::Loaded);
    assert_eq!(h.playback.snapshot().total_seconds, 20.0);
    assert_eq!(h.scheduler.active_count(), 0);
}

/// WHAT: Transport calls without a loaded asset are rejected
/// WHY: There is nothing to play, seek or adjust
#[tokio::test]
async fn given_nothing_loaded_when_using_transport_then_all_rejected() {
    // Given: An unloaded session
    let h = Harness::new();

    // When/Then: Every transport call fails
    assert!(!h.playback.play().await);
    assert!(!h.playback.pause().await);
    assert!(!h.playback.resume().await);
    assert!(!h.playback.seek_to(1.0).await);
    assert!(!h.playback.set_volume(0.5).await);
    assert!(!h.playback.set_playback_rate(1.5).await);
    assert_eq!(h.playback.status(), PlayerStatus::Unloaded);
}

/// WHAT: The position poller runs only while playing
/// WHY: A paused player has no position changes worth sampling
#[tokio::test]
async fn given_loaded_asset_when_playing_pausing_resuming_then_poller_follows() {
    // Given: A loaded asset
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 10)).await);

    // When/Then: Play starts the poller, pause stops it, resume restarts it
    assert!(h.playback.play().await);
    assert_eq!(h.playback.status(), PlayerStatus::Playing);
    assert_eq!(h.scheduler.active_count(), 1);
    assert!(!h.playback.play().await);

    assert!(h.playback.pause().await);
    assert_eq!(h.playback.status(), PlayerStatus::Paused);
    assert_eq!(h.scheduler.active_count(), 0);

    assert!(h.playback.resume().await);
    assert_eq!(h.playback.status(), PlayerStatus::Playing);
    assert_eq!(h.scheduler.active_count(), 1);
}

/// WHAT: Each poll publishes the platform position
/// WHY: The progress bar is driven from these snapshots
#[tokio::test]
async fn given_playing_asset_when_polled_then_position_published() {
    // Given: A playing asset with an observer
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 10)).await);
    let (seen, observer) = collector::<PlaybackState>();
    let _subscription = h.playback.subscribe(observer);
    assert!(h.playback.play().await);

    // When: Two seconds pass and the poller fires
    h.clock.advance(Duration::from_secs(2));
    h.scheduler.fire().await;

    // Then: The new position is published
    assert_eq!(h.playback.snapshot().position_seconds, 2.0);
    let seen = seen.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(seen.last().map(|s| s.position_seconds), Some(2.0));
    assert!(seen.iter().all(|s| !(s.is_playing && s.is_paused)));
}

/// WHAT: Reaching the end behaves exactly like an explicit stop
/// WHY: Natural completion and user stop must leave identical state
#[tokio::test]
async fn given_playing_asset_when_end_reached_then_state_matches_stop() {
    // Given: A 3 second asset playing
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 3)).await);
    assert!(h.playback.play().await);

    // When: Playback runs past the end and the poller notices
    h.clock.advance(Duration::from_secs(4));
    h.scheduler.fire().await;

    // Then: Unloaded, released, no poller
    let completed = h.playback.snapshot();
    assert_eq!(completed, PlaybackState::default());
    assert_eq!(h.platform.live_players(), 0);
    assert_eq!(h.scheduler.active_count(), 0);

    // And: Identical to what an explicit stop produces
    assert!(h.playback.load(h.asset("b", 3)).await);
    assert!(h.playback.play().await);
    assert!(h.playback.stop().await);
    assert_eq!(h.playback.snapshot(), completed);
}

/// WHAT: Seeking while paused moves the playhead without playing
/// WHY: Scrubbing a paused recording must not start audio
#[tokio::test]
async fn given_paused_asset_when_seeking_then_position_moves_and_still_paused() {
    // Given: A paused asset
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 12)).await);
    assert!(h.playback.play().await);
    h.clock.advance(Duration::from_secs(1));
    assert!(h.playback.pause().await);

    // When: Seeking to 5 seconds
    let sought = h.playback.seek_to(5.0).await;

    // Then: Paused at 5 seconds
    assert!(sought);
    assert_eq!(h.playback.status(), PlayerStatus::Paused);
    assert_eq!(h.playback.snapshot().position_seconds, 5.0);
}

/// WHAT: Negative and non-finite seek targets are refused
/// WHY: State must never report a position the player was not sent
#[tokio::test]
async fn given_paused_asset_when_seeking_to_invalid_target_then_false_and_position_kept() {
    // Given: An asset paused at 3 seconds
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 12)).await);
    assert!(h.playback.seek_to(3.0).await);

    // When: Seeking before the start or to NaN
    let negative = h.playback.seek_to(-5.0).await;
    let not_a_number = h.playback.seek_to(f64::NAN).await;

    // Then: Both refused without touching the position or recording an error
    assert!(!negative);
    assert!(!not_a_number);
    assert_eq!(h.playback.snapshot().position_seconds, 3.0);
    assert_eq!(h.playback.last_error(), None);
}

/// WHAT: Seeking while playing continues from the new position
/// WHY: The next poll must reflect the seek, not the old playhead
#[tokio::test]
async fn given_playing_asset_when_seeking_then_poll_continues_from_target() {
    // Given: A playing asset
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 12)).await);
    assert!(h.playback.play().await);

    // When: Seeking to 6 seconds and playing one more second
    assert!(h.playback.seek_to(6.0).await);
    h.clock.advance(Duration::from_secs(1));
    h.scheduler.fire().await;

    // Then: Position is 7 seconds
    assert_eq!(h.playback.snapshot().position_seconds, 7.0);
}

/// WHAT: Playback rate scales how fast the playhead moves
/// WHY: Rate is applied to the platform player, not simulated by the session
#[tokio::test]
async fn given_double_rate_when_playing_then_position_advances_twice_as_fast() {
    // Given: A loaded asset at double speed and half volume
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 12)).await);
    assert!(h.playback.set_volume(0.5).await);
    assert!(h.playback.set_playback_rate(2.0).await);
    assert_eq!(h.platform.volume(), Some(0.5));

    // When: Playing for one second
    assert!(h.playback.play().await);
    h.clock.advance(Duration::from_secs(1));
    h.scheduler.fire().await;

    // Then: Two seconds of audio were covered
    assert_eq!(h.playback.snapshot().position_seconds, 2.0);
}

/// WHAT: Stop is idempotent and notifies only on a real transition
/// WHY: UI teardown paths call stop without checking state
#[tokio::test]
async fn given_any_state_when_stopping_repeatedly_then_always_true() {
    // Given: An unloaded session with an observer
    let h = Harness::new();
    let (seen, observer) = collector::<PlaybackState>();
    let _subscription = h.playback.subscribe(observer);

    // When/Then: Stop on nothing succeeds silently
    assert!(h.playback.stop().await);
    assert!(seen.lock().unwrap_or_else(|e| e.into_inner()).is_empty());

    // When/Then: Stop after load releases once, later stops are silent
    assert!(h.playback.load(h.asset("a", 5)).await);
    assert!(h.playback.stop().await);
    assert!(h.playback.stop().await);
    assert_eq!(h.platform.live_players(), 0);

    let seen = seen.lock().unwrap_or_else(|e| e.into_inner());
    let statuses: Vec<_> = seen.iter().map(PlaybackState::status).collect();
    assert_eq!(statuses, vec![PlayerStatus::Loaded, PlayerStatus::Unloaded]);
}

/// WHAT: A failing platform pause keeps the session playing
/// WHY: The player is still producing audio
#[tokio::test]
async fn given_failing_pause_primitive_when_pausing_then_still_playing() {
    // Given: A playing asset whose pause will fail
    let h = Harness::new();
    assert!(h.playback.load(h.asset("a", 10)).await);
    assert!(h.playback.play().await);
    h.platform.fail_pause(true);

    // When: Pausing
    let paused = h.playback.pause().await;

    // Then: Still playing with a live poller
    assert!(!paused);
    assert_eq!(h.playback.status(), PlayerStatus::Playing);
    assert_eq!(h.scheduler.active_count(), 1);
    assert_eq!(h.playback.last_error(), Some(ErrorKind::PrimitiveFailure));
}

/// WHAT: A finished recording can be played back immediately
/// WHY: Recording and playback share the same file reference
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_finished_recording_when_loading_then_total_matches_capture() {
    // Given: A 4 second recording
    let h = Harness::new();
    assert!(h.recording.start().await);
    h.tick_seconds(4).await;
    let saved = h.recording.stop().await.unwrap();

    // When: Loading it
    assert!(h.playback.load(saved).await);

    // Then: Its decoded length is the captured time
    assert_eq!(h.playback.snapshot().total_seconds, 4.0);
}
