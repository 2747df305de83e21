//! Tab registry: the ordered collection of tabs plus active-tab tracking.

use super::{Tab, TabColor, TabId, normalize_name};

/// Ordered collection of tabs within a session.
///
/// The registry owns ordering, activation tracking, and per-tab metadata
/// mutation. It does not touch storage or buffers — the session layer
/// persists after every mutation and keeps the never-empty invariant by
/// synthesizing a replacement tab when the last one closes.
pub struct TabRegistry {
    /// All tabs in this session, in insertion order
    tabs: Vec<Tab>,
    /// Currently active tab ID
    active_tab_id: Option<TabId>,
}

impl TabRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    /// Rebuild a registry from persisted tabs. The active id is validated:
    /// if it does not resolve to a member, the first tab becomes active.
    pub fn from_tabs(tabs: Vec<Tab>, active: Option<TabId>) -> Self {
        let active_tab_id = active
            .filter(|id| tabs.iter().any(|t| t.id == *id))
            .or_else(|| tabs.first().map(|t| t.id));
        Self {
            tabs,
            active_tab_id,
        }
    }

    /// Append a tab and make it active. Returns its id.
    pub fn push_tab(&mut self, tab: Tab) -> TabId {
        let id = tab.id;
        self.tabs.push(tab);
        self.active_tab_id = Some(id);
        log::info!("Created new tab {} (total: {})", id, self.tabs.len());
        id
    }

    /// Remove a tab by ID, returning the removed tab.
    ///
    /// If the removed tab was active, activation migrates to the tab that
    /// shifted into the same index, or the previous index if the removed tab
    /// was last. The caller is responsible for restoring the never-empty
    /// invariant when this removes the sole tab.
    pub fn remove_tab(&mut self, id: TabId) -> Option<Tab> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;

        log::info!("Closing tab {} (index {})", id, idx);
        let tab = self.tabs.remove(idx);

        if self.active_tab_id == Some(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                // Prefer the tab at the same index (or previous if at end)
                let new_idx = idx.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].id)
            };
        }

        Some(tab)
    }

    /// Rename a tab. Returns `true` if the normalized name differed from the
    /// current one; `false` means no change and no persistence is needed.
    pub fn rename_tab(&mut self, id: TabId, new_name: &str) -> bool {
        let Some(tab) = self.get_tab_mut(id) else {
            return false;
        };
        let normalized = normalize_name(new_name);
        if tab.name == normalized {
            return false;
        }
        log::debug!("Renamed tab {} to '{}'", id, normalized);
        tab.name = normalized;
        true
    }

    /// Set a tab's color tag. Returns `true` if the color changed.
    pub fn set_color(&mut self, id: TabId, color: TabColor) -> bool {
        let Some(tab) = self.get_tab_mut(id) else {
            return false;
        };
        if tab.color == color {
            return false;
        }
        tab.color = color;
        true
    }

    /// Set a tab's language mode. Returns `true` if it changed.
    pub fn set_language(&mut self, id: TabId, language: &str) -> bool {
        let Some(tab) = self.get_tab_mut(id) else {
            return false;
        };
        if tab.language == language {
            return false;
        }
        tab.language = language.to_string();
        true
    }

    /// Move a tab to a specific index (used by drag-and-drop reordering).
    /// Returns true if the tab was actually moved, false if not found or
    /// already at the target.
    pub fn move_tab_to_index(&mut self, id: TabId, target_index: usize) -> bool {
        let current_idx = match self.tabs.iter().position(|t| t.id == id) {
            Some(idx) => idx,
            None => return false,
        };

        let clamped_target = target_index.min(self.tabs.len().saturating_sub(1));
        if clamped_target == current_idx {
            return false;
        }

        let tab = self.tabs.remove(current_idx);
        self.tabs.insert(clamped_target, tab);
        log::debug!(
            "Moved tab {} from index {} to {}",
            id,
            current_idx,
            clamped_target
        );
        true
    }

    /// Switch to a tab by ID. Unknown ids are ignored.
    pub fn switch_to(&mut self, id: TabId) {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_tab_id = Some(id);
            log::debug!("Switched to tab {}", id);
        }
    }

    /// Id of the tab after the active one, wrapping around.
    pub fn next_tab_id(&self) -> Option<TabId> {
        let current = self.active_tab_index()?;
        let next = (current + 1) % self.tabs.len();
        Some(self.tabs[next].id)
    }

    /// Id of the tab before the active one, wrapping around.
    pub fn prev_tab_id(&self) -> Option<TabId> {
        let current = self.active_tab_index()?;
        let prev = if current == 0 {
            self.tabs.len() - 1
        } else {
            current - 1
        };
        Some(self.tabs[prev].id)
    }

    /// Map a 1-based ordinal (as on number-key shortcuts) to a tab id.
    /// Ordinal 9 always means the last tab regardless of count.
    pub fn tab_id_at_ordinal(&self, ordinal: u8) -> Option<TabId> {
        if self.tabs.is_empty() || ordinal == 0 {
            return None;
        }
        if ordinal == 9 {
            return self.tabs.last().map(|t| t.id);
        }
        self.tabs.get(ordinal as usize - 1).map(|t| t.id)
    }

    /// Get a reference to the active tab.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    /// Get a mutable reference to the active tab.
    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let active_id = self.active_tab_id;
        active_id.and_then(move |id| self.tabs.iter_mut().find(|t| t.id == id))
    }

    /// Get the active tab ID.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// Get index of active tab (0-based).
    pub fn active_tab_index(&self) -> Option<usize> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().position(|t| t.id == id))
    }

    /// Get a tab by ID.
    pub fn get_tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a tab by ID.
    pub fn get_tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    /// Whether a tab with this id exists.
    pub fn contains(&self, id: TabId) -> bool {
        self.tabs.iter().any(|t| t.id == id)
    }

    /// Get the number of tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// True when no tabs remain (the session layer repairs this state
    /// immediately).
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Get all tabs as a slice.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}
