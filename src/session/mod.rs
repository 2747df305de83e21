//! Session state and activation control.
//!
//! `Session` is the single owned state object for the whole tab subsystem:
//! it composes the tab registry, buffer cache, save scheduler and closed-tab
//! history over a durable store and an external editing surface. Hosts
//! construct one with [`Session::init`], drive it with synchronous calls
//! (plus [`Session::tick`] for debounced flushes), and finish with
//! [`Session::teardown`].
//!
//! Recovery policy: initialization never fails. Corrupt or missing persisted
//! state loads as empty and is repaired (bootstrap tab, re-seeded content
//! keys, dangling active id falling back to the first tab); persistence
//! failures during operation are logged and degrade locally, never
//! surfacing to the caller.

mod actions;

pub use actions::SessionAction;

use crate::buffer::BufferCache;
use crate::history::{ClosedTabEntry, ClosedTabHistory, HistoryId};
use crate::keys;
use crate::save::SaveScheduler;
use crate::surface::{BufferHandle, EditorSurface};
use crate::tab::{DEFAULT_LANGUAGE, Tab, TabColor, TabId, TabMeta, TabRegistry};
use anyhow::{Context, Result};
use quickpad_store::KeyValueStore;
use std::collections::HashSet;
use std::time::Instant;

/// Optional fields for tab creation; unset fields take their defaults
/// (empty name, the global default language, empty content, neutral color).
#[derive(Debug, Clone, Default)]
pub struct NewTabOptions {
    pub name: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    pub color: Option<TabColor>,
}

/// In-progress inline rename.
#[derive(Debug, Clone)]
struct RenameState {
    id: TabId,
    text: String,
}

/// The session: all tab/buffer/persistence state behind one object.
pub struct Session<S: KeyValueStore, E: EditorSurface> {
    store: S,
    surface: E,
    registry: TabRegistry,
    buffers: BufferCache,
    saver: SaveScheduler,
    history: ClosedTabHistory,
    rename: Option<RenameState>,
    /// Tab whose activation should start an inline rename instead of
    /// placing the cursor (rename-on-create).
    deferred_rename: Option<TabId>,
}

impl<S: KeyValueStore, E: EditorSurface> Session<S, E> {
    /// Rehydrate a session from the store, repairing whatever is missing or
    /// inconsistent, and bind the active tab's buffer to the surface.
    pub fn init(store: S, surface: E) -> Self {
        let mut session = Self {
            store,
            surface,
            registry: TabRegistry::new(),
            buffers: BufferCache::new(),
            saver: SaveScheduler::new(),
            history: ClosedTabHistory::new(),
            rename: None,
            deferred_rename: None,
        };

        if let Some(theme) = session.store.get(keys::EDITOR_THEME) {
            session.surface.apply_theme(&theme);
        }

        let metas: Vec<TabMeta> = session.store.get_json(keys::TABS_META).unwrap_or_default();
        let mut seen = HashSet::new();
        let tabs: Vec<Tab> = metas
            .into_iter()
            .filter(|m| {
                if seen.insert(m.id) {
                    true
                } else {
                    log::warn!("Dropping duplicate persisted tab id {}", m.id);
                    false
                }
            })
            .map(Tab::from_meta)
            .collect();

        // Repair the content-entry invariant: every registry tab must have
        // a model key, even if storage was tampered with.
        for tab in &tabs {
            let key = keys::content_key(tab.id);
            if !session.store.contains(&key) {
                log::warn!("Re-seeding missing content for tab {}", tab.id);
                if let Err(e) = session.store.set(&key, "") {
                    log::warn!("Failed to re-seed content for tab {}: {e}", tab.id);
                }
            }
        }

        let active = session
            .store
            .get(keys::ACTIVE_TAB_ID)
            .and_then(|raw| TabId::parse(&raw));
        session.registry = TabRegistry::from_tabs(tabs, active);
        session.history = ClosedTabHistory::load(&session.store);

        if session.registry.is_empty() {
            log::info!("No persisted tabs; bootstrapping a default tab");
            session.create_tab(NewTabOptions::default());
        } else if let Some(id) = session.registry.active_tab_id() {
            session.activate(id);
        }

        session
    }

    // -------------------------------------------------------------------
    // Tab lifecycle
    // -------------------------------------------------------------------

    /// Create a tab and activate it. Returns the new tab's id.
    pub fn create_tab(&mut self, opts: NewTabOptions) -> TabId {
        self.create_tab_inner(opts, false)
    }

    /// Create a tab whose activation starts an inline rename instead of
    /// placing the cursor (the "new tab" keyboard affordance).
    pub fn create_tab_interactive(&mut self, opts: NewTabOptions) -> TabId {
        self.create_tab_inner(opts, true)
    }

    fn create_tab_inner(&mut self, opts: NewTabOptions, defer_rename: bool) -> TabId {
        let language = opts
            .language
            .unwrap_or_else(|| self.language_for_new_tabs());
        let color = opts.color.unwrap_or_default();
        let tab = Tab::new(opts.name.as_deref().unwrap_or(""), &language, color);
        let content = opts.content.unwrap_or_default();

        // Seed the content entry first so the tab-has-content invariant
        // holds as soon as the metadata is persisted.
        if let Err(e) = self.store.set(&keys::content_key(tab.id), &content) {
            log::warn!("Failed to seed content for new tab {}: {e}", tab.id);
        }

        let id = self.registry.push_tab(tab);
        self.persist_tabs();
        if defer_rename {
            self.deferred_rename = Some(id);
        }
        self.activate(id);
        id
    }

    /// Close a tab: snapshot it into history, dispose its buffer, delete its
    /// content entry, and migrate activation. Closing the sole remaining tab
    /// replaces it with a fresh default tab in the same language.
    pub fn close_tab(&mut self, id: TabId) {
        let Some(tab) = self.registry.get_tab(id) else {
            return;
        };
        let (name, language, color) = (tab.name.clone(), tab.language.clone(), tab.color);

        // Capture content before anything is torn down: prefer the live
        // buffer, fall back to the persisted copy.
        let content = self
            .buffers
            .handle(id)
            .and_then(|h| self.surface.buffer_content(h))
            .or_else(|| self.store.get(&keys::content_key(id)))
            .unwrap_or_default();

        let entry = ClosedTabEntry::new(&name, &language, color, &content);
        self.history.push(entry, &mut self.store);

        // A pending flush for a closed tab must never write.
        self.saver.cancel(id);
        if self.rename.as_ref().is_some_and(|r| r.id == id) {
            self.rename = None;
        }
        if self.deferred_rename == Some(id) {
            self.deferred_rename = None;
        }

        let was_active = self.registry.active_tab_id() == Some(id);
        self.registry.remove_tab(id);
        // Dispose before deleting the content key so a stale buffer cannot
        // resurrect content for a half-deleted tab.
        self.buffers.dispose(id, &mut self.surface);
        self.store.remove(&keys::content_key(id));
        self.persist_tabs();

        if self.registry.is_empty() {
            // The registry is never left empty: synthesize a default tab in
            // the closed tab's language.
            self.create_tab(NewTabOptions {
                language: Some(language),
                ..NewTabOptions::default()
            });
        } else if was_active {
            if let Some(next) = self.registry.active_tab_id() {
                self.activate(next);
            }
        }
    }

    /// Close whichever tab is active.
    pub fn close_active_tab(&mut self) {
        if let Some(id) = self.registry.active_tab_id() {
            self.close_tab(id);
        }
    }

    /// Reopen a closed tab from history — a specific entry, or the most
    /// recent when `history_id` is `None`. The tab comes back with a brand
    /// new id and is activated. Returns the new id, or `None` when there was
    /// nothing to reopen.
    pub fn reopen(&mut self, history_id: Option<HistoryId>) -> Option<TabId> {
        let entry = self.history.take(history_id, &mut self.store)?;
        log::info!("Reopening closed tab '{}'", entry.name);
        Some(self.create_tab(NewTabOptions {
            name: Some(entry.name),
            language: Some(entry.language),
            content: Some(entry.content),
            color: Some(entry.color),
        }))
    }

    // -------------------------------------------------------------------
    // Activation
    // -------------------------------------------------------------------

    /// Make a tab current: rebind the surface to its buffer, restore its
    /// language, and place the cursor at the end of its content — unless a
    /// rename was deferred for this tab, in which case inline rename starts
    /// instead. Unknown ids are ignored.
    pub fn activate(&mut self, id: TabId) {
        if !self.registry.contains(id) {
            log::warn!("Ignoring activation of unknown tab {}", id);
            return;
        }
        // A rename in progress on another tab is committed, not dropped.
        if self.rename.as_ref().is_some_and(|r| r.id != id) {
            self.commit_rename();
        }

        self.registry.switch_to(id);
        if let Err(e) = self.store.set(keys::ACTIVE_TAB_ID, &id.to_string()) {
            log::warn!("Failed to persist active tab id: {e}");
        }

        let Some(tab) = self.registry.get_tab(id) else {
            return;
        };
        let handle = self
            .buffers
            .ensure_buffer(tab, &self.store, &mut self.surface);
        self.surface.bind_active(handle);
        self.surface.set_buffer_language(handle, &tab.language);

        if self.deferred_rename == Some(id) {
            self.deferred_rename = None;
            self.begin_rename(id);
        } else {
            self.surface.cursor_to_end(handle);
        }
    }

    /// Activate the next tab in order, wrapping around.
    pub fn next_tab(&mut self) {
        if let Some(id) = self.registry.next_tab_id() {
            self.activate(id);
        }
    }

    /// Activate the previous tab in order, wrapping around.
    pub fn prev_tab(&mut self) {
        if let Some(id) = self.registry.prev_tab_id() {
            self.activate(id);
        }
    }

    /// Activate by 1-based ordinal; 9 always means the last tab. Ordinals
    /// past the end are ignored.
    pub fn jump_to(&mut self, ordinal: u8) {
        if let Some(id) = self.registry.tab_id_at_ordinal(ordinal) {
            self.activate(id);
        }
    }

    // -------------------------------------------------------------------
    // Metadata mutation
    // -------------------------------------------------------------------

    /// Rename a tab. No-ops (including persistence) when the normalized
    /// name is unchanged.
    pub fn rename_tab(&mut self, id: TabId, new_name: &str) {
        if self.registry.rename_tab(id, new_name) {
            self.persist_tabs();
        }
    }

    /// Set a tab's color from arbitrary input, normalized to the nearest
    /// palette member (or the default when unparseable).
    pub fn set_color(&mut self, id: TabId, color: &str) {
        if self.registry.set_color(id, TabColor::normalize(color)) {
            self.persist_tabs();
        }
    }

    /// Step a tab's color to the next palette entry, wrapping.
    pub fn cycle_color(&mut self, id: TabId) {
        let Some(next) = self.registry.get_tab(id).map(|t| t.color.next()) else {
            return;
        };
        if self.registry.set_color(id, next) {
            self.persist_tabs();
        }
    }

    /// Reset a tab's color to the neutral default.
    pub fn reset_color(&mut self, id: TabId) {
        if self.registry.set_color(id, TabColor::DEFAULT) {
            self.persist_tabs();
        }
    }

    /// Change a tab's language mode, updating its live buffer if one exists.
    pub fn set_language(&mut self, id: TabId, language: &str) {
        if self.registry.set_language(id, language) {
            self.persist_tabs();
            if let Some(handle) = self.buffers.handle(id) {
                self.surface.set_buffer_language(handle, language);
            }
        }
    }

    /// Reorder a tab to a target index (clamped). Persists when a move
    /// actually happened.
    pub fn move_tab(&mut self, id: TabId, target_index: usize) {
        if self.registry.move_tab_to_index(id, target_index) {
            self.persist_tabs();
        }
    }

    // -------------------------------------------------------------------
    // Inline rename
    // -------------------------------------------------------------------

    /// Start an inline rename on a tab, seeded with its current name.
    pub fn begin_rename(&mut self, id: TabId) {
        let Some(tab) = self.registry.get_tab(id) else {
            return;
        };
        self.rename = Some(RenameState {
            id,
            text: tab.name.clone(),
        });
    }

    /// Replace the in-progress rename text.
    pub fn rename_input(&mut self, text: &str) {
        if let Some(rename) = &mut self.rename {
            text.clone_into(&mut rename.text);
        }
    }

    /// Commit the in-progress rename, if any.
    pub fn commit_rename(&mut self) {
        if let Some(rename) = self.rename.take() {
            self.rename_tab(rename.id, &rename.text);
        }
    }

    /// Abandon the in-progress rename.
    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    /// The tab currently in inline-rename mode, if any.
    pub fn rename_target(&self) -> Option<TabId> {
        self.rename.as_ref().map(|r| r.id)
    }

    // -------------------------------------------------------------------
    // Content changes and debounced saves
    // -------------------------------------------------------------------

    /// Record a content-change notification for the active tab: mark it
    /// dirty immediately and (re)arm its debounced flush. No-ops when the
    /// active tab has no live buffer.
    pub fn note_content_changed(&mut self, now: Instant) {
        let Some(id) = self.registry.active_tab_id() else {
            return;
        };
        if self.buffers.handle(id).is_none() {
            return;
        }
        if let Some(tab) = self.registry.get_tab_mut(id) {
            tab.dirty = true;
        }
        self.saver.note_change(id, now);
    }

    /// Fire every debounce deadline that has passed, flushing buffer content
    /// to storage and clearing dirty flags on success. Call this from the
    /// host event loop; [`Session::next_save_deadline`] says when the next
    /// call is worthwhile.
    pub fn tick(&mut self, now: Instant) {
        for id in self.saver.take_due(now) {
            self.flush_tab(id);
        }
    }

    /// Earliest pending flush deadline, if any.
    pub fn next_save_deadline(&self) -> Option<Instant> {
        self.saver.next_deadline()
    }

    /// Write one tab's buffer content to its content key. A tab that was
    /// closed mid-flight, or whose buffer is gone, is a guarded no-op. On
    /// write failure the dirty flag stays set; the next edit re-arms a fresh
    /// attempt.
    fn flush_tab(&mut self, id: TabId) {
        if !self.registry.contains(id) {
            log::debug!("Skipping flush for closed tab {}", id);
            return;
        }
        let Some(content) = self
            .buffers
            .handle(id)
            .and_then(|h| self.surface.buffer_content(h))
        else {
            return;
        };
        match self.store.set(&keys::content_key(id), &content) {
            Ok(()) => {
                if let Some(tab) = self.registry.get_tab_mut(id) {
                    tab.dirty = false;
                }
                log::debug!("Flushed {} bytes for tab {}", content.len(), id);
            }
            Err(e) => {
                log::warn!("Content flush failed for tab {} (left dirty): {e}", id);
            }
        }
    }

    // -------------------------------------------------------------------
    // Global preferences
    // -------------------------------------------------------------------

    /// Persist and apply a global editor theme.
    pub fn set_theme(&mut self, theme: &str) {
        if let Err(e) = self.store.set(keys::EDITOR_THEME, theme) {
            log::warn!("Failed to persist editor theme: {e}");
        }
        self.surface.apply_theme(theme);
    }

    /// Persist the default language used for tabs created without an
    /// explicit one.
    pub fn set_default_language(&mut self, language: &str) {
        if let Err(e) = self.store.set(keys::EDITOR_LANGUAGE, language) {
            log::warn!("Failed to persist default language: {e}");
        }
    }

    /// The language new tabs get when none is specified.
    pub fn language_for_new_tabs(&self) -> String {
        self.store
            .get(keys::EDITOR_LANGUAGE)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    // -------------------------------------------------------------------
    // History access
    // -------------------------------------------------------------------

    /// Closed-tab history, newest first.
    pub fn history(&self) -> &[ClosedTabEntry] {
        self.history.entries()
    }

    /// Discard one history entry without reopening it.
    pub fn remove_history_entry(&mut self, id: HistoryId) -> bool {
        self.history.remove(id, &mut self.store)
    }

    /// Empty the closed-tab history.
    pub fn clear_history(&mut self) {
        self.history.clear(&mut self.store);
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// All tabs in order.
    pub fn tabs(&self) -> &[Tab] {
        self.registry.tabs()
    }

    /// The active tab. Present whenever the session holds any tab, which is
    /// always after `init`.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.registry.active_tab()
    }

    /// Id of the active tab.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.registry.active_tab_id()
    }

    /// Buffer handle of the active tab, if materialized.
    pub fn active_buffer(&self) -> Option<BufferHandle> {
        self.registry
            .active_tab_id()
            .and_then(|id| self.buffers.handle(id))
    }

    /// The underlying store (read access, for hosts and tests).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The editing surface (hosts feed simulated edits through this in
    /// headless setups).
    pub fn surface_mut(&mut self) -> &mut E {
        &mut self.surface
    }

    // -------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------

    /// Commit any in-progress rename, flush all unsaved content
    /// immediately, and release every buffer. Returns an error if a final
    /// content write failed (state remains recoverable: dirty content is
    /// simply absent from storage).
    pub fn teardown(mut self) -> Result<()> {
        self.commit_rename();

        let mut first_failure: Option<quickpad_store::StoreError> = None;
        for id in self.saver.drain() {
            if !self.registry.contains(id) {
                continue;
            }
            let Some(content) = self
                .buffers
                .handle(id)
                .and_then(|h| self.surface.buffer_content(h))
            else {
                continue;
            };
            if let Err(e) = self.store.set(&keys::content_key(id), &content) {
                log::warn!("Final flush failed for tab {}: {e}", id);
                first_failure.get_or_insert(e);
            }
        }
        self.buffers.dispose_all(&mut self.surface);

        match first_failure {
            None => Ok(()),
            Some(e) => Err(e).context("final content flush failed during teardown"),
        }
    }

    fn persist_tabs(&mut self) {
        let metas: Vec<TabMeta> = self.registry.tabs().iter().map(Tab::to_meta).collect();
        if let Err(e) = self.store.set_json(keys::TABS_META, &metas) {
            log::warn!("Failed to persist tab metadata: {e}");
        }
    }
}
