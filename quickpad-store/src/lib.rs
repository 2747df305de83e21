//! Durable key/value preference store for quickpad.
//!
//! This crate provides the persistence substrate the session layer writes
//! through: a small string-keyed, string-valued store trait plus two
//! backends:
//!
//! - [`MemoryStore`]: `HashMap`-backed, with an optional byte budget so
//!   callers can exercise quota-exhaustion paths deterministically
//! - [`FileStore`]: one file per key under a platform config directory,
//!   written atomically (temp file + rename)
//!
//! Typed JSON access is layered on top of the raw trait via
//! [`KeyValueStore::get_json`] and [`KeyValueStore::set_json`]. Reads are
//! deliberately infallible: corrupt JSON or unreadable files are logged and
//! reported as absent so callers fall back to defaults instead of failing
//! initialization.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A durable, string-keyed, string-valued store.
///
/// Implementations must make `set` durable by the time it returns; there is
/// no separate flush step. Only writes can fail — `get` reports any
/// unreadable or missing value as `None`.
pub trait KeyValueStore {
    /// Read the raw string value for `key`, if present and readable.
    fn get(&self, key: &str) -> Option<String>;

    /// Durably write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key` if present. Removing an absent key is a no-op.
    fn remove(&mut self, key: &str);

    /// True if `key` currently has a stored value.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Read and decode a JSON value stored under `key`.
    ///
    /// Corrupt JSON is treated the same as an absent key: a warning is
    /// logged and `None` is returned, never an error. This is the safe-parse
    /// boundary — no malformed persisted state propagates past it.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt JSON under store key '{key}': {e}");
                None
            }
        }
    }

    /// Encode `value` as JSON and durably write it under `key`.
    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn json_roundtrip_through_trait() {
        let mut store = MemoryStore::new();
        store.set_json("point", &Point { x: 3, y: 7 }).unwrap();
        let back: Point = store.get_json("point").unwrap();
        assert_eq!(back, Point { x: 3, y: 7 });
    }

    #[test]
    fn corrupt_json_reads_as_absent() {
        let mut store = MemoryStore::new();
        store.set("point", "{not json at all").unwrap();
        let back: Option<Point> = store.get_json("point");
        assert!(back.is_none());
        // The raw value is untouched; only the typed read falls back.
        assert!(store.contains("point"));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let back: Option<Point> = store.get_json("nope");
        assert!(back.is_none());
        assert!(!store.contains("nope"));
    }
}
