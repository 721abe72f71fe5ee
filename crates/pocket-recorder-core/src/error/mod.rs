use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use thiserror::Error;

/// Session and storage errors with source location tracking.
///
/// These never cross the session boundary: public session operations
/// log them and report a boolean (or `None`) instead.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The user declined microphone access.
    #[error("Recording permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform rejected both the primary and the fallback audio mode.
    #[error("Audio mode configuration rejected: {reason} {location}")]
    DeviceConfig {
        /// Description of the last rejection.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A platform recording or playback call failed.
    #[error("Platform {operation} failed: {reason} {location}")]
    PrimitiveFailure {
        /// The primitive operation that failed (e.g. `prepare`).
        operation: &'static str,
        /// Description reported by the platform.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A playback asset could not be opened.
    #[error("Failed to load {uri}: {reason} {location}")]
    Load {
        /// URI of the asset that failed to open.
        uri: String,
        /// Description reported by the platform.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The key-value store failed to read or write.
    #[error("Storage error: {reason} {location}")]
    Storage {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A persisted value could not be encoded or decoded.
    #[error("Serialization error: {source} {location}")]
    Serialization {
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl SessionError {
    /// Build a [`SessionError::PrimitiveFailure`] at the caller's location.
    #[track_caller]
    pub fn primitive(operation: &'static str, reason: impl fmt::Display) -> Self {
        SessionError::PrimitiveFailure {
            operation,
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`SessionError::Storage`] at the caller's location.
    #[track_caller]
    pub fn storage(reason: impl fmt::Display) -> Self {
        SessionError::Storage {
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Coarse classification retained by sessions for the UI.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            SessionError::DeviceConfig { .. } => ErrorKind::DeviceConfigError,
            SessionError::PrimitiveFailure { .. } => ErrorKind::PrimitiveFailure,
            SessionError::Load { .. } => ErrorKind::LoadError,
            SessionError::Storage { .. } | SessionError::Serialization { .. } => {
                ErrorKind::StorageError
            }
        }
    }
}

// Manual From<serde_json::Error> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<serde_json::Error> for SessionError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        SessionError::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Error classification surfaced through `last_error()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Microphone access declined.
    PermissionDenied,
    /// Audio mode rejected even after fallback.
    DeviceConfigError,
    /// A platform call failed.
    PrimitiveFailure,
    /// Playback asset failed to open.
    LoadError,
    /// Catalog or session snapshot could not be persisted.
    StorageError,
}

impl ErrorKind {
    /// Whether the UI should offer a retry for this failure.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::PrimitiveFailure | ErrorKind::LoadError | ErrorKind::DeviceConfigError
        )
    }
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
