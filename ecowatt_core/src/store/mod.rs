//! # Key-Value Store
//!
//! The calculators share state through a flat string-to-string store (the
//! same shape as browser local storage): values are JSON documents under
//! well-known keys such as [`crate::bridge::HANDOFF_KEY`] or
//! [`crate::project::DB_KEY`].
//!
//! Backends:
//! - [`MemoryStore`]: in-process map, used by tests and throwaway sessions
//! - [`FileStore`]: one JSON file on disk with atomic writes and a lock file
//!   (native targets only)
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::store::{KeyValueStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.set("greeting", "\"hello\"").unwrap();
//! let value: Option<String> = store.get_json("greeting").unwrap();
//! assert_eq!(value.as_deref(), Some("hello"));
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

#[cfg(not(target_arch = "wasm32"))]
pub use file::{FileLock, FileStore, LockInfo};

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{CalcError, CalcResult};

/// String key-value storage shared by all calculators.
pub trait KeyValueStore {
    /// Raw value under `key`, if any
    fn get(&self, key: &str) -> CalcResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> CalcResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> CalcResult<()>;

    /// Read and deserialize the JSON value under `key`
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> CalcResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CalcError::serialization(format!("Invalid JSON under '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Serialize `value` to JSON and store it under `key`
    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> CalcResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value).map_err(CalcError::serialization)?;
        self.set(key, &raw)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CalcResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CalcResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CalcResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        store.set_json("numbers", &vec![1, 2, 3]).unwrap();
        let numbers: Option<Vec<i32>> = store.get_json("numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        store.set("broken", "{not json").unwrap();
        let err = store.get_json::<Vec<i32>>("broken").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
