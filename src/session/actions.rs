//! Keyboard-surface actions.
//!
//! Hosts own key-chord decoding; once a chord resolves, they hand the
//! session one of these actions. Keeping the mapping as data (rather than
//! closures capturing session state) lets tests drive the full keyboard
//! surface without any rendered UI.

use super::{NewTabOptions, Session};
use crate::surface::EditorSurface;
use quickpad_store::KeyValueStore;

/// One logical keyboard action on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a fresh tab and start renaming it inline.
    NewTab,
    /// Close the active tab (the registry is never left empty).
    CloseActiveTab,
    /// Reopen the most recently closed tab.
    ReopenClosed,
    /// Start an inline rename on the active tab.
    RenameActiveTab,
    /// Activate the next tab, wrapping.
    NextTab,
    /// Activate the previous tab, wrapping.
    PrevTab,
    /// Activate by 1-based ordinal; 9 always means the last tab.
    JumpToTab(u8),
    /// Step the active tab's color through the palette.
    CycleColor,
}

impl<S: KeyValueStore, E: EditorSurface> Session<S, E> {
    /// Apply one keyboard action.
    pub fn dispatch(&mut self, action: SessionAction) {
        log::debug!("Dispatching {:?}", action);
        match action {
            SessionAction::NewTab => {
                self.create_tab_interactive(NewTabOptions::default());
            }
            SessionAction::CloseActiveTab => self.close_active_tab(),
            SessionAction::ReopenClosed => {
                self.reopen(None);
            }
            SessionAction::RenameActiveTab => {
                if let Some(id) = self.active_tab_id() {
                    self.begin_rename(id);
                }
            }
            SessionAction::NextTab => self.next_tab(),
            SessionAction::PrevTab => self.prev_tab(),
            SessionAction::JumpToTab(ordinal) => self.jump_to(ordinal),
            SessionAction::CycleColor => {
                if let Some(id) = self.active_tab_id() {
                    self.cycle_color(id);
                }
            }
        }
    }
}
