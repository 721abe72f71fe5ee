use crate::{
    DirectoryMediaLibrary, FileStore, KeyValueStore, ManualClock, ManualScheduler, MediaLibrary,
    RecordingCatalog, RecordingOptions, RecordingSession, SessionContext, SimulatedPlatform,
    tests::support::test_epoch,
};

use std::sync::Arc;

use tempfile::TempDir;

/// WHAT: Values written by one store are read back by a fresh one
/// WHY: The catalog must survive a process restart
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_written_value_when_reopening_store_then_value_survives() {
    // Given: A value written to a store in a temp directory
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path()).await.unwrap();
    store.set("recordings", "[]").await.unwrap();

    // When: Reopening the directory
    let reopened = FileStore::open(temp_dir.path()).await.unwrap();

    // Then: The value is there and no temp file was left behind
    assert_eq!(reopened.get("recordings").await.unwrap().as_deref(), Some("[]"));
    assert!(temp_dir.path().join("recordings.json").exists());
    assert!(!temp_dir.path().join("recordings.json.tmp").exists());
}

/// WHAT: Missing keys read as None and remove is idempotent
/// WHY: First launch has no files at all
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_key_when_reading_or_removing_then_no_error() {
    // Given: An empty store
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path().join("nested")).await.unwrap();

    // When/Then: Reads and removes of unknown keys succeed
    assert_eq!(store.get("recordings").await.unwrap(), None);
    store.remove("recordings").await.unwrap();

    // When/Then: A written key can be removed
    store.set("recordings", "[1]").await.unwrap();
    store.remove("recordings").await.unwrap();
    assert_eq!(store.get("recordings").await.unwrap(), None);
}

/// WHAT: Overwrites replace the whole value
/// WHY: A shorter value must not leave the tail of a longer one behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_long_value_when_overwriting_with_short_then_exact_value() {
    // Given: A long stored value
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path()).await.unwrap();
    store.set("k", "a much longer value").await.unwrap();

    // When: Overwriting with a short one
    store.set("k", "short").await.unwrap();

    // Then: Only the short value remains
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("short"));
}

/// WHAT: A recording on disk is catalogued and copied into the gallery
/// WHY: Exercises the file-backed stack the binary runs on
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_file_backed_session_when_stopping_then_catalogued_and_copied() {
    // Given: A session writing into a temp directory with a gallery
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::starting_at(test_epoch()));
    let store = Arc::new(FileStore::open(temp_dir.path().join("store")).await.unwrap());
    let context = SessionContext {
        clock: clock.clone(),
        scheduler: Arc::new(ManualScheduler::new()),
        store: store.clone(),
    };
    let platform = SimulatedPlatform::with_output_dir(clock, temp_dir.path().join("audio"));
    std::fs::create_dir_all(temp_dir.path().join("audio")).unwrap();
    let recording = RecordingSession::new(
        Arc::new(platform),
        RecordingCatalog::new(store.clone()),
        context,
        RecordingOptions::default(),
    );
    let gallery_dir = temp_dir.path().join("gallery");
    let gallery: Arc<dyn MediaLibrary> = Arc::new(DirectoryMediaLibrary::new(&gallery_dir));
    recording.set_media_library(gallery);

    // When: Recording and stopping
    assert!(recording.start().await);
    let saved = recording.stop().await.unwrap();

    // Then: The catalog file lists it and the gallery holds a copy
    let reopened = RecordingCatalog::new(Arc::new(
        FileStore::open(temp_dir.path().join("store")).await.unwrap(),
    ));
    assert_eq!(reopened.get_all().await.unwrap(), vec![saved.clone()]);
    assert!(
        gallery_dir
            .join("recording_2026-10-19T08-30-15-000Z.m4a")
            .exists()
    );
}

/// WHAT: Copying a missing file fails with a storage error
/// WHY: The gallery must report, not hide, a missing source
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_source_when_saving_to_gallery_then_error() {
    // Given: A gallery and a URI with no file behind it
    let temp_dir = TempDir::new().unwrap();
    let gallery = DirectoryMediaLibrary::new(temp_dir.path().join("gallery"));
    let missing = format!("file://{}", temp_dir.path().join("nope.m4a").display());

    // When: Saving
    let result = gallery.save(&missing).await;

    // Then: A storage error
    assert_eq!(result.unwrap_err().kind(), crate::ErrorKind::StorageError);
}
