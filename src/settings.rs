//! Game settings and preferences
//!
//! Persisted separately from the leaderboard through the storage collaborator.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Volume change per menu step
pub const VOLUME_STEP: f32 = 0.1;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            sfx_volume: 0.7,
        }
    }
}

/// Apply `delta` and snap to the nearest step inside [0, 1]
fn step_volume(current: f32, delta: f32) -> f32 {
    let stepped = ((current + delta) / VOLUME_STEP).round() * VOLUME_STEP;
    stepped.clamp(0.0, 1.0)
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    pub fn adjust_music(&mut self, delta: f32) {
        self.music_volume = step_volume(self.music_volume, delta);
    }

    pub fn adjust_sfx(&mut self, delta: f32) {
        self.sfx_volume = step_volume(self.sfx_volume, delta);
    }

    /// Clamp values that arrived out of range from storage
    fn sanitized(mut self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        self.music_volume = fix(self.music_volume);
        self.sfx_volume = fix(self.sfx_volume);
        self
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &impl Storage) -> Self {
        match storage.read_json::<Settings>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings.sanitized()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut impl Storage) {
        match storage.write_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Failed to save settings: {e}"),
        }
    }
}
