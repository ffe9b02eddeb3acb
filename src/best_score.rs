//! Best score
//!
//! A single integer kept across sessions. Stored as a decimal string so the
//! value stays readable in the browser's storage inspector.

use crate::storage::{KeyValueStore, StorageError};

/// Highest score ever finished with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore {
    pub value: u32,
}

impl BestScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "math-fun-kids-best-score";

    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// Whether `score` would replace the current best
    pub fn beaten_by(&self, score: u32) -> bool {
        score > self.value
    }

    /// Record `score` if it strictly beats the best. Returns true when updated.
    pub fn record(&mut self, score: u32) -> bool {
        if !self.beaten_by(score) {
            return false;
        }
        self.value = score;
        true
    }

    /// Load from storage, falling back to 0 when absent or unreadable
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(value) => {
                    log::info!("Loaded best score {}", value);
                    Self { value }
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable best score {:?}: {}", raw, e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read best score: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(Self::STORAGE_KEY, &self.value.to_string())?;
        log::info!("Best score saved ({})", self.value);
        Ok(())
    }
}
