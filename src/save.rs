//! Debounced save scheduling.
//!
//! Each edited tab gets one pending flush deadline; re-editing within the
//! debounce window replaces (cancels) the earlier deadline rather than
//! stacking a second one, so at most one pending flush exists per tab at any
//! instant. The scheduler owns the deadlines only — the session layer reads
//! buffer content and writes storage when a deadline fires.
//!
//! The host drives time explicitly: it passes `Instant::now()` into
//! `note_change` and calls `take_due` from its event loop. No threads or
//! timers live here, which keeps every debounce path deterministic in tests.

use crate::tab::TabId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Quiet period after the last edit before content is flushed to storage.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(700);

/// Per-tab debounce deadlines for content write-back.
#[derive(Debug, Default)]
pub struct SaveScheduler {
    /// Pending flush deadline per tab. One entry per tab at most; arming
    /// replaces any earlier deadline.
    deadlines: HashMap<TabId, Instant>,
}

impl SaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit at `now`: (re)arm the tab's flush deadline at
    /// `now + DEBOUNCE_DELAY`, cancelling any earlier pending deadline.
    pub fn note_change(&mut self, id: TabId, now: Instant) {
        self.deadlines.insert(id, now + DEBOUNCE_DELAY);
        log::trace!("Armed save deadline for tab {}", id);
    }

    /// Remove and return every tab whose deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<TabId> {
        let due: Vec<TabId> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&id, _)| id)
            .collect();
        for id in &due {
            self.deadlines.remove(id);
        }
        due
    }

    /// Drop the tab's pending deadline, if any (tab closed, or flush handled
    /// out of band).
    pub fn cancel(&mut self, id: TabId) {
        if self.deadlines.remove(&id).is_some() {
            log::trace!("Cancelled save deadline for tab {}", id);
        }
    }

    /// Remove and return every pending tab regardless of deadline
    /// (teardown flush).
    pub fn drain(&mut self) -> Vec<TabId> {
        self.deadlines.drain().map(|(id, _)| id).collect()
    }

    /// Whether this tab has a pending flush.
    pub fn is_pending(&self, id: TabId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Earliest pending deadline, for hosts that schedule a wakeup.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// True when nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }
}
