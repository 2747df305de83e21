//! Lazy buffer cache: tab id to live surface buffer handle.

use crate::keys;
use crate::surface::{BufferHandle, EditorSurface};
use crate::tab::{Tab, TabId};
use quickpad_store::KeyValueStore;
use std::collections::HashMap;

/// Lazy mapping from tab id to the surface buffer holding its content.
///
/// The cache exclusively owns buffer lifetime: a buffer is created on first
/// access, seeded from the persisted content for that tab (or empty), and
/// disposed exactly once when its tab closes. At most one live handle exists
/// per tab id.
#[derive(Debug, Default)]
pub struct BufferCache {
    handles: HashMap<TabId, BufferHandle>,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tab's buffer handle, creating the buffer on first access.
    ///
    /// Creation seeds the buffer from the persisted `model:<id>` content, or
    /// empty when none exists. Idempotent: a second call returns the same
    /// handle without touching the surface.
    pub fn ensure_buffer<S, E>(&mut self, tab: &Tab, store: &S, surface: &mut E) -> BufferHandle
    where
        S: KeyValueStore,
        E: EditorSurface,
    {
        if let Some(&handle) = self.handles.get(&tab.id) {
            return handle;
        }
        let seed = store.get(&keys::content_key(tab.id)).unwrap_or_default();
        let handle = surface.create_buffer(&seed, &tab.language, &tab.uri());
        log::debug!("Materialized buffer for tab {} ({} bytes)", tab.id, seed.len());
        self.handles.insert(tab.id, handle);
        handle
    }

    /// The tab's handle, if its buffer has been materialized.
    pub fn handle(&self, id: TabId) -> Option<BufferHandle> {
        self.handles.get(&id).copied()
    }

    /// Dispose the tab's buffer if one exists. Must run before the tab's
    /// content key is removed from storage, so a stale buffer can never be
    /// resurrected from a half-deleted tab.
    pub fn dispose<E: EditorSurface>(&mut self, id: TabId, surface: &mut E) {
        if let Some(handle) = self.handles.remove(&id) {
            surface.dispose_buffer(handle);
            log::debug!("Disposed buffer for tab {}", id);
        }
    }

    /// Dispose every cached buffer (session teardown).
    pub fn dispose_all<E: EditorSurface>(&mut self, surface: &mut E) {
        for (_, handle) in self.handles.drain() {
            surface.dispose_buffer(handle);
        }
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when no buffers have been materialized.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
