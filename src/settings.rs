//! Player settings and preferences
//!
//! Persisted as JSON next to the best score.

use serde::{Deserialize, Serialize};

use crate::quiz::{Category, Rules};
use crate::storage::{self, KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gameplay ===
    /// Show a confirmation overlay before quitting a round
    pub confirm_quit: bool,
    /// A timeout also breaks the combo streak
    pub reset_combo_on_timeout: bool,
    /// Category selected on the menu last time
    pub last_category: Option<Category>,

    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confirm_quit: false,
            reset_combo_on_timeout: false,
            last_category: None,

            sfx_volume: 0.7,
            music_volume: 0.3,
            muted: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "math-fun-kids-settings";

    /// State machine switches
    pub fn rules(&self) -> Rules {
        Rules {
            confirm_quit: self.confirm_quit,
            reset_combo_on_timeout: self.reset_combo_on_timeout,
        }
    }

    /// Volumes clamped to 0.0 - 1.0
    pub fn normalized(mut self) -> Self {
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }

    /// Effective cue volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match storage::load_json::<Self, S>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings.normalized()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        storage::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_match_classic_rules() {
        let rules = Settings::default().rules();
        assert!(!rules.confirm_quit);
        assert!(!rules.reset_combo_on_timeout);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            confirm_quit: true,
            last_category: Some(Category::Fractions),
            ..Default::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, r#"{"muted":true,"sfx_volume":4.0}"#);
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.sfx_volume, 1.0);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.music_volume, Settings::default().music_volume);
    }

    #[test]
    fn test_corrupt_json_falls_back() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, "}}");
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
