use crate::{CoreResult, SessionError, storage::KeyValueStore};

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// [`KeyValueStore`] keeping one JSON file per key in a directory.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// target, so a crash mid-write never leaves a truncated value behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    #[instrument(skip(dir))]
    pub async fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            SessionError::storage(format!("Failed to create store directory {dir:?}: {e}"))
        })?;

        debug!(dir = ?dir, "File store opened");

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::storage(format!("Failed to read {key}: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| SessionError::storage(format!("Failed to create temp file: {e}")))?;

        temp_file
            .write_all(value.as_bytes())
            .await
            .map_err(|e| SessionError::storage(format!("Failed to write temp file: {e}")))?;

        temp_file
            .sync_all()
            .await
            .map_err(|e| SessionError::storage(format!("Failed to sync temp file: {e}")))?;

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| SessionError::storage(format!("Failed to replace {key}: {e}")))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::storage(format!("Failed to remove {key}: {e}"))),
        }
    }
}
