//! Configuration management for pocket-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation before the sessions are built, and atomic write
//! operations.

use crate::{
    AppError, AppResult,
    config::{BehaviourConfig, PlaybackConfig, RecordingConfig, StorageConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// On-disk locations.
    pub storage: StorageConfig,
    /// Recording session tuning.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Playback session tuning.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
}

impl Config {
    /// Default configuration with every directory under `data_root`.
    pub fn with_defaults(data_root: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::under(data_root),
            recording: RecordingConfig::default(),
            playback: PlaybackConfig::default(),
            behavior: BehaviourConfig::default(),
        }
    }

    /// Load configuration from the platform config directory, creating a
    /// default one if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;

        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Self::load_from(&config_dir.join("config.toml"), proj_dirs.data_dir())
    }

    /// Load configuration from `config_path`, writing a default rooted at
    /// `data_root` if the file does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path, data_root: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!("No config found, creating default");
            let config = Self::with_defaults(data_root);
            config.save_to(config_path)?;
            warn!(config_path = ?config_path, "Default config created");
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::Config {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::Config {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Reject values the sessions cannot run with.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let problem = if self.recording.tick_interval_ms == 0 {
            Some("recording.tick_interval_ms must be greater than zero")
        } else if self.playback.poll_interval_ms == 0 {
            Some("playback.poll_interval_ms must be greater than zero")
        } else if self.recording.file_extension.trim().is_empty() {
            Some("recording.file_extension must not be empty")
        } else if self.recording.file_extension.contains(['.', '/', '\\']) {
            Some("recording.file_extension must be a bare extension such as m4a")
        } else {
            None
        };

        match problem {
            Some(reason) => Err(AppError::Config {
                reason: reason.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::Config {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::Config {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::Config {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::Config {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::Config {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Directory the rolling log files are written into.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "pocket-recorder", "Pocket-Recorder").ok_or_else(|| {
            AppError::Config {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
