mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod playback_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, config::Config, playback_config::PlaybackConfig,
    recording_config::RecordingConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub(crate) const DEFAULT_MAX_START_RETRIES: u32 = 2;
pub(crate) const DEFAULT_FILE_EXTENSION: &str = "m4a";
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
pub(crate) const DEFAULT_SAVE_TO_GALLERY: bool = true;
pub(crate) const DEFAULT_RESET_CATALOG_ON_LAUNCH: bool = false;

pub(crate) fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

pub(crate) fn default_max_start_retries() -> u32 {
    DEFAULT_MAX_START_RETRIES
}

pub(crate) fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_save_to_gallery() -> bool {
    DEFAULT_SAVE_TO_GALLERY
}

pub(crate) fn default_reset_catalog_on_launch() -> bool {
    DEFAULT_RESET_CATALOG_ON_LAUNCH
}
