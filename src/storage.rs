//! Key-value persistence
//!
//! The game persists two things: the best score and the settings. Both go
//! through [`KeyValueStore`] so the controller never knows whether it is
//! talking to LocalStorage or a test map.

use std::collections::HashMap;

use thiserror::Error;

/// Errors surfaced by storage backends
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    /// No backing store (no window, storage disabled, private mode)
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage access failed: {0}")]
    Access(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }
}

/// Read a JSON value, `None` if absent
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

/// Write a value as JSON
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: serde::Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), Ok(None));
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Ok(Some("v".to_string())));
        store.set("k", "w").unwrap();
        assert_eq!(store.get("k"), Ok(Some("w".to_string())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "list", &vec![1u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = load_json(&store, "list").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = load_json(&store, "nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let store = MemoryStore::with_entry("list", "{not json");
        let result: Result<Option<Vec<u32>>, _> = load_json(&store, "list");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
