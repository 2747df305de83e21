//! Tab management for multi-document session support
//!
//! This module provides the core tab infrastructure including:
//! - `Tab`: Represents a single document session with its own state
//! - `TabRegistry`: Ordered collection of tabs plus active-tab tracking
//! - `TabId`: Unique identifier for each tab
//! - `TabColor`: Fixed-palette color tags

mod color;
mod registry;

pub use color::{PALETTE, TabColor};
pub use registry::TabRegistry;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name cap, in characters.
pub const MAX_NAME_CHARS: usize = 64;

/// Placeholder shown for tabs with an empty name.
pub const UNTITLED: &str = "untitled";

/// Language mode used when no global default has been chosen.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Unique identifier for a tab, stable for the tab's lifetime and never
/// reused — a reopened tab gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(Uuid);

impl TabId {
    /// Allocate a new unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a persisted id. Returns `None` for anything that is not a
    /// hyphenated UUID, so tampered storage falls back instead of panicking.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One open document session (metadata only — content lives in the buffer
/// cache and the store).
#[derive(Debug, Clone)]
pub struct Tab {
    /// Unique identifier for this tab
    pub id: TabId,
    /// User-visible label; empty renders as the untitled placeholder
    pub name: String,
    /// Syntax/formatting mode identifier
    pub language: String,
    /// Color tag from the fixed palette
    pub color: TabColor,
    /// Whether this tab has unsaved edits awaiting the debounced flush.
    /// Transient: never persisted.
    pub dirty: bool,
}

/// Persisted form of a tab: everything but the transient dirty flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabMeta {
    pub id: TabId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub color: TabColor,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Tab {
    /// Create a tab with a fresh id and normalized fields.
    pub fn new(name: &str, language: &str, color: TabColor) -> Self {
        Self {
            id: TabId::new(),
            name: normalize_name(name),
            language: language.to_string(),
            color,
            dirty: false,
        }
    }

    /// Rebuild a tab from its persisted metadata.
    pub fn from_meta(meta: TabMeta) -> Self {
        Self {
            id: meta.id,
            // Re-normalize on load in case the stored value predates the
            // current normalization rules or was edited externally.
            name: normalize_name(&meta.name),
            language: meta.language,
            color: meta.color,
            dirty: false,
        }
    }

    /// Persisted form of this tab.
    pub fn to_meta(&self) -> TabMeta {
        TabMeta {
            id: self.id,
            name: self.name.clone(),
            language: self.language.clone(),
            color: self.color,
        }
    }

    /// Synthetic in-memory locator for this tab's buffer, derived
    /// deterministically from the id.
    pub fn uri(&self) -> String {
        format!("quickpad://{}", self.id)
    }

    /// Name to display: the normalized name, or the untitled placeholder.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNTITLED
        } else {
            &self.name
        }
    }
}

/// Normalize a user-supplied tab name: strip control characters, collapse
/// whitespace runs to single spaces, trim, and cap the length. The empty
/// string is a valid result.
pub fn normalize_name(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}
