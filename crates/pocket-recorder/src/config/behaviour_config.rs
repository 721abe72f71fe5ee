use crate::config::{
    DEFAULT_RESET_CATALOG_ON_LAUNCH, DEFAULT_SAVE_TO_GALLERY, default_reset_catalog_on_launch,
    default_save_to_gallery,
};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Copy every finished recording into the gallery directory.
    #[serde(default = "default_save_to_gallery")]
    pub save_to_gallery: bool,
    /// Wipe the recordings catalog every time the app starts.
    #[serde(default = "default_reset_catalog_on_launch")]
    pub reset_catalog_on_launch: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            save_to_gallery: DEFAULT_SAVE_TO_GALLERY,
            reset_catalog_on_launch: DEFAULT_RESET_CATALOG_ON_LAUNCH,
        }
    }
}
