use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where recordings, the catalog and the gallery live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the key-value store (catalog and session state).
    pub data_dir: PathBuf,
    /// Directory new recordings are written into.
    pub recordings_dir: PathBuf,
    /// Directory finished recordings are copied into when gallery saving is on.
    pub gallery_dir: PathBuf,
}

impl StorageConfig {
    /// Default layout under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data_dir: root.join("store"),
            recordings_dir: root.join("recordings"),
            gallery_dir: root.join("gallery"),
        }
    }
}
