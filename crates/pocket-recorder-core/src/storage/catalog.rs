use crate::{
    CoreResult,
    storage::{KeyValueStore, SavedRecording},
};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

/// Key holding the serialized recordings array.
pub const CATALOG_KEY: &str = "recordings";

/// Durable list of completed recordings.
///
/// Every mutation is a read-modify-write of a single JSON array. Concurrent
/// writers are not reconciled: the last write wins.
#[derive(Clone)]
pub struct RecordingCatalog {
    store: Arc<dyn KeyValueStore>,
}

impl RecordingCatalog {
    /// Create a catalog over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All recordings, oldest first. A missing or blank value is an empty catalog.
    pub async fn get_all(&self) -> CoreResult<Vec<SavedRecording>> {
        match self.store.get(CATALOG_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Look up one recording by id.
    pub async fn get(&self, id: &str) -> CoreResult<Option<SavedRecording>> {
        Ok(self.get_all().await?.into_iter().find(|r| r.id == id))
    }

    /// Add a recording at the end of the catalog.
    #[instrument(skip(self, recording), fields(id = %recording.id))]
    pub async fn append(&self, recording: SavedRecording) -> CoreResult<()> {
        let mut all = self.get_all().await?;
        all.push(recording);
        self.write(&all).await?;

        debug!(count = all.len(), "Recording added to catalog");

        Ok(())
    }

    /// Remove the first recording whose id is `id`.
    ///
    /// Returns whether an entry was removed. All other entries are written
    /// back unchanged.
    #[instrument(skip(self))]
    pub async fn remove_by_id(&self, id: &str) -> CoreResult<bool> {
        let mut all = self.get_all().await?;
        let Some(index) = all.iter().position(|r| r.id == id) else {
            warn!("Recording not found in catalog");
            return Ok(false);
        };

        all.remove(index);
        self.write(&all).await?;

        info!(remaining = all.len(), "Recording removed from catalog");

        Ok(true)
    }

    /// Drop every recording.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CoreResult<()> {
        self.store.remove(CATALOG_KEY).await?;
        warn!("Recording catalog cleared");
        Ok(())
    }

    async fn write(&self, all: &[SavedRecording]) -> CoreResult<()> {
        let raw = serde_json::to_string(all)?;
        self.store.set(CATALOG_KEY, &raw).await
    }
}
