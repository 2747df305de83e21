//! Typed error variants for the quickpad-store crate.
//!
//! Provides structured error types so callers at the crate boundary can match
//! on specific failure modes instead of opaque strings. Write failures are
//! the interesting case: the session layer degrades differently for capacity
//! exhaustion (evict and retry) than for plain I/O errors (leave dirty).

use thiserror::Error;

/// Errors that can occur when writing to a durable key/value store.
///
/// Reads never error: a missing or unreadable key is reported as absent so
/// callers can fall back to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred writing the value to disk.
    #[error("store write failed for key '{key}': {source}")]
    Io {
        /// The key whose write failed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store's capacity budget would be exceeded by this write.
    ///
    /// Mirrors browser-style storage quota exhaustion; callers are expected
    /// to shed data and retry rather than treat this as fatal.
    #[error("store capacity exceeded writing key '{key}' ({needed} bytes needed, {available} available)")]
    CapacityExceeded {
        /// The key whose write failed.
        key: String,
        /// Bytes the write would have required.
        needed: usize,
        /// Bytes remaining in the budget.
        available: usize,
    },

    /// A value could not be serialized to JSON before writing.
    #[error("store serialization failed for key '{key}': {source}")]
    Serialize {
        /// The key whose value failed to serialize.
        key: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// True when the failure was a capacity/quota condition that shedding
    /// data could resolve.
    pub fn is_capacity(&self) -> bool {
        matches!(self, StoreError::CapacityExceeded { .. })
    }
}
