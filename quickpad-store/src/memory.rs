//! In-memory store backend.

use crate::{KeyValueStore, StoreError};
use std::collections::HashMap;

/// `HashMap`-backed store with an optional byte budget.
///
/// The budget counts the UTF-8 lengths of all stored keys and values and
/// makes `set` fail with [`StoreError::CapacityExceeded`] when a write would
/// overflow it, mimicking browser storage quotas. With no budget the store
/// never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Maximum total bytes across keys and values, if bounded.
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once `capacity` total bytes of
    /// keys and values are held.
    pub fn with_capacity_bytes(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Total bytes currently held across all keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(capacity) = self.capacity {
            let existing = self.entries.get(key).map(|v| v.len()).unwrap_or(0);
            let existing_key = if self.entries.contains_key(key) {
                key.len()
            } else {
                0
            };
            let needed = key.len() + value.len();
            let available = capacity
                .saturating_sub(self.used_bytes() - existing - existing_key);
            if needed > available {
                return Err(StoreError::CapacityExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
