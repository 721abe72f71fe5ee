use crate::{CoreResult, SessionError};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

/// Shared media gallery that finished recordings are copied into.
///
/// Failures here never fail the operation that triggered the copy.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Copy the file at `file_uri` into the gallery.
    async fn save(&self, file_uri: &str) -> CoreResult<()>;
}

/// Gallery backed by a plain directory.
pub struct DirectoryMediaLibrary {
    dir: PathBuf,
}

impl DirectoryMediaLibrary {
    /// Create a gallery that copies into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn local_path(file_uri: &str) -> &Path {
        Path::new(file_uri.strip_prefix("file://").unwrap_or(file_uri))
    }
}

#[async_trait]
impl MediaLibrary for DirectoryMediaLibrary {
    #[instrument(skip(self))]
    async fn save(&self, file_uri: &str) -> CoreResult<()> {
        let source = Self::local_path(file_uri);
        let file_name = source
            .file_name()
            .ok_or_else(|| SessionError::storage(format!("No file name in {file_uri}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SessionError::storage(format!("Failed to create gallery: {e}")))?;

        let target = self.dir.join(file_name);
        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| SessionError::storage(format!("Failed to copy {file_uri}: {e}")))?;

        debug!(target = ?target, "Recording copied to gallery");

        Ok(())
    }
}
