//! quickpad: tab and session management for a multi-buffer scratchpad
//! editor.
//!
//! The text-editing engine itself is external — hosts implement
//! [`surface::EditorSurface`] over their editor widget and hand the session
//! a [`quickpad_store::KeyValueStore`] for persistence. Everything else
//! (tab registry, lazy buffer cache, debounced content saves, bounded
//! closed-tab history, activation control) lives here behind a single
//! [`session::Session`] object driven by synchronous calls from the host
//! event loop.

/// Application version (root crate version, for use by hosts).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod buffer;
pub mod history;
pub mod keys;
pub mod save;
pub mod session;
pub mod surface;
pub mod tab;

// Re-export main types for convenience
pub use buffer::BufferCache;
pub use history::{ClosedTabEntry, ClosedTabHistory, HistoryId, MAX_HISTORY};
pub use save::{DEBOUNCE_DELAY, SaveScheduler};
pub use session::{NewTabOptions, Session, SessionAction};
pub use surface::{BufferHandle, EditorSurface, HeadlessSurface};
pub use tab::{Tab, TabColor, TabId, TabRegistry};

// Re-export the store crate so hosts depend on one crate only.
pub use quickpad_store::{FileStore, KeyValueStore, MemoryStore, StoreError};
