use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished recording, as stored in the catalog.
///
/// Created only by a successful stop and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecording {
    /// Unique, time-derived identifier.
    pub id: String,
    /// Display name shown in the recordings list.
    pub name: String,
    /// Location of the audio file.
    pub file_uri: String,
    /// Active recording time, fixed at stop.
    pub duration_seconds: u64,
    /// When the recording was stopped. Serialized as ISO-8601.
    pub created_at: DateTime<Utc>,
}
