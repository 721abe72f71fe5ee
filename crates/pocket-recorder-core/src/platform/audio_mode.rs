use serde::{Deserialize, Serialize};

/// Audio session configuration applied before each recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMode {
    /// Allow recording on iOS.
    pub record_on_ios: bool,
    /// Keep playing when the hardware silent switch is on.
    pub play_in_silent_mode: bool,
    /// Keep the audio session alive while the app is backgrounded.
    pub stays_active_in_background: bool,
    /// Lower other apps' audio instead of stopping it (Android).
    pub duck_android: bool,
    /// Route playback through the earpiece (Android).
    pub earpiece_android: bool,
}

impl AudioMode {
    /// Full configuration tried first.
    pub const fn primary() -> Self {
        Self {
            record_on_ios: true,
            play_in_silent_mode: true,
            stays_active_in_background: true,
            duck_android: true,
            earpiece_android: false,
        }
    }

    /// Minimal configuration tried when the platform rejects [`AudioMode::primary`].
    pub const fn fallback() -> Self {
        Self {
            record_on_ios: true,
            play_in_silent_mode: true,
            stays_active_in_background: false,
            duck_android: false,
            earpiece_android: false,
        }
    }
}
