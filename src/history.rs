//! Bounded history of recently closed tabs.
//!
//! Entries are immutable snapshots taken at close time, newest first,
//! independent of the registry's lifetime: they survive reloads and are
//! unaffected by anything that happens to live tabs afterwards. Capacity is
//! fixed; when persistence fails (storage quota), the history sheds its
//! oldest entries and retries rather than losing the newest ones.

use crate::keys;
use crate::tab::TabColor;
use chrono::Utc;
use quickpad_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum retained entries; pushing beyond this drops the oldest.
pub const MAX_HISTORY: usize = 10;

/// When persistence keeps failing, stop shedding once this many entries
/// remain and keep them in memory only.
pub const HISTORY_FLOOR: usize = 3;

/// Identifier for one history entry (distinct from any tab id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(Uuid);

impl HistoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Immutable snapshot of a closed tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTabEntry {
    pub history_id: HistoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub color: TabColor,
    #[serde(default)]
    pub content: String,
    /// RFC 3339 UTC timestamp of the close.
    #[serde(default)]
    pub closed_at: String,
}

impl ClosedTabEntry {
    /// Snapshot a closing tab's state, stamped with the current time.
    pub fn new(name: &str, language: &str, color: TabColor, content: &str) -> Self {
        Self {
            history_id: HistoryId::new(),
            name: name.to_string(),
            language: language.to_string(),
            color,
            content: content.to_string(),
            closed_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Bounded stack of recently closed tabs, newest first.
#[derive(Debug, Default)]
pub struct ClosedTabHistory {
    entries: Vec<ClosedTabEntry>,
}

impl ClosedTabHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from storage. Corrupt or missing history loads as empty.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let mut entries: Vec<ClosedTabEntry> =
            store.get_json(keys::CLOSED_HISTORY).unwrap_or_default();
        entries.truncate(MAX_HISTORY);
        if !entries.is_empty() {
            log::info!("Loaded {} closed-tab history entries", entries.len());
        }
        Self { entries }
    }

    /// Prepend a snapshot, evict beyond capacity, and persist.
    ///
    /// If the store rejects the write, the oldest entries are dropped one at
    /// a time and the write retried, down to [`HISTORY_FLOOR`] — below that
    /// the in-memory entries are kept unpersisted rather than discarded.
    pub fn push<S: KeyValueStore>(&mut self, entry: ClosedTabEntry, store: &mut S) {
        log::info!(
            "Pushed closed tab '{}' into history (entries: {})",
            entry.name,
            self.entries.len() + 1
        );
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY);
        self.persist(store);
    }

    /// Remove and return a specific entry, or the most recent when `id` is
    /// `None`.
    pub fn take<S: KeyValueStore>(
        &mut self,
        id: Option<HistoryId>,
        store: &mut S,
    ) -> Option<ClosedTabEntry> {
        let idx = match id {
            Some(id) => self.entries.iter().position(|e| e.history_id == id)?,
            None => {
                if self.entries.is_empty() {
                    return None;
                }
                0
            }
        };
        let entry = self.entries.remove(idx);
        self.persist(store);
        Some(entry)
    }

    /// Delete a single entry without reopening it. Returns whether it
    /// existed.
    pub fn remove<S: KeyValueStore>(&mut self, id: HistoryId, store: &mut S) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.history_id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist(store);
        }
        removed
    }

    /// Empty the history and persist the empty state.
    pub fn clear<S: KeyValueStore>(&mut self, store: &mut S) {
        self.entries.clear();
        self.persist(store);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[ClosedTabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist<S: KeyValueStore>(&mut self, store: &mut S) {
        loop {
            match store.set_json(keys::CLOSED_HISTORY, &self.entries) {
                Ok(()) => return,
                Err(e) if self.entries.len() > HISTORY_FLOOR => {
                    // Shed the oldest entry and try again; the newest
                    // snapshots are the ones worth keeping.
                    self.entries.pop();
                    log::warn!(
                        "History persist failed ({e}); retrying with {} entries",
                        self.entries.len()
                    );
                }
                Err(e) => {
                    log::warn!(
                        "History persist failed at floor of {} entries; keeping in memory only: {e}",
                        self.entries.len()
                    );
                    return;
                }
            }
        }
    }
}
