use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External signal that may affect an in-progress recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionKind {
    /// Incoming or outgoing phone call.
    Call,
    /// A notification grabbed the audio session.
    Notification,
    /// Another app started playing or recording.
    OtherApp,
    /// A system alert (alarm, low battery, ...).
    SystemAlert,
    /// The app moved to the background.
    AppBackground,
    /// The app returned to the foreground.
    AppForeground,
}

impl InterruptionKind {
    /// Every kind, in declaration order.
    pub const ALL: [InterruptionKind; 6] = [
        InterruptionKind::Call,
        InterruptionKind::Notification,
        InterruptionKind::OtherApp,
        InterruptionKind::SystemAlert,
        InterruptionKind::AppBackground,
        InterruptionKind::AppForeground,
    ];

    /// Whether this kind pauses an active recording.
    ///
    /// Backgrounding keeps recording; foregrounding never auto-resumes.
    pub fn pauses_recording(self) -> bool {
        matches!(
            self,
            InterruptionKind::Call
                | InterruptionKind::Notification
                | InterruptionKind::OtherApp
                | InterruptionKind::SystemAlert
        )
    }

    /// Wire name, as used in serialized history.
    pub fn as_str(self) -> &'static str {
        match self {
            InterruptionKind::Call => "call",
            InterruptionKind::Notification => "notification",
            InterruptionKind::OtherApp => "other_app",
            InterruptionKind::SystemAlert => "system_alert",
            InterruptionKind::AppBackground => "app_background",
            InterruptionKind::AppForeground => "app_foreground",
        }
    }
}

impl fmt::Display for InterruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterruptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterruptionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown interruption kind: {s}"))
    }
}

/// One entry in the interruption history.
///
/// Only `handled` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptionEvent {
    /// What happened.
    pub kind: InterruptionKind,
    /// When it was received.
    pub timestamp: DateTime<Utc>,
    /// Set once the policy has run and listeners were told.
    pub handled: bool,
}

/// Foreground state reported by the app-state signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// The app is in the foreground.
    Active,
    /// The app is in the background.
    Background,
}
