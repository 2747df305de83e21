//! Storage key namespace for the session layer.
//!
//! Every durable blob lives under one of these string keys in the preference
//! store. The `V1` suffixes version the JSON schemas so a future migration
//! can read old keys side by side with new ones.

use crate::tab::TabId;

/// JSON array of persisted tab metadata (excluding the transient dirty flag).
pub const TABS_META: &str = "tabsMetaV1";

/// Id of the currently active tab.
pub const ACTIVE_TAB_ID: &str = "activeTabIdV1";

/// JSON array of closed-tab history entries, newest first.
pub const CLOSED_HISTORY: &str = "closedHistoryV1";

/// Last-selected global editor theme.
pub const EDITOR_THEME: &str = "editorTheme";

/// Last-selected global default language.
pub const EDITOR_LANGUAGE: &str = "editorLanguage";

/// Storage key holding the raw content string for one tab.
pub fn content_key(id: TabId) -> String {
    format!("model:{id}")
}
