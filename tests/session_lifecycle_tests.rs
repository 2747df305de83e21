//! End-to-end tests for session lifecycle invariants
//!
//! Covers the behaviors the session object guarantees across arbitrary
//! create/close/activate sequences:
//! - The registry never drops to zero tabs; closing the last tab
//!   synthesizes a replacement default tab
//! - Tab ids are unique and the active id always resolves to a member
//! - Close captures a history snapshot before content storage is deleted,
//!   and reopen reinstates it under a brand-new id
//! - Activation rebinds the single editing surface atomically and restores
//!   per-tab language and cursor state

use quickpad::session::{NewTabOptions, Session};
use quickpad::surface::HeadlessSurface;
use quickpad::tab::UNTITLED;
use quickpad::{KeyValueStore, MemoryStore, keys};
use std::collections::HashSet;

fn session() -> Session<MemoryStore, HeadlessSurface> {
    Session::init(MemoryStore::new(), HeadlessSurface::new())
}

fn named(name: &str) -> NewTabOptions {
    NewTabOptions {
        name: Some(name.to_string()),
        ..NewTabOptions::default()
    }
}

// ============================================================================
// Registry invariants
// ============================================================================

#[test]
fn registry_never_empty_across_lifecycle_churn() {
    let mut session = session();
    for round in 0..5 {
        session.create_tab(named(&format!("tab {round}")));
        assert!(!session.tabs().is_empty());
    }
    // Close everything, repeatedly — the floor is one tab.
    for _ in 0..20 {
        session.close_active_tab();
        assert!(!session.tabs().is_empty());
        let active = session.active_tab_id().unwrap();
        assert!(session.tabs().iter().any(|t| t.id == active));
    }
    assert_eq!(session.tabs().len(), 1);
}

#[test]
fn ids_are_unique_and_active_always_resolves() {
    let mut session = session();
    let mut ids = HashSet::new();
    for i in 0..10 {
        ids.insert(session.create_tab(named(&format!("t{i}"))));
    }
    session.close_active_tab();
    session.close_active_tab();
    session.create_tab(NewTabOptions::default());

    let live: Vec<_> = session.tabs().iter().map(|t| t.id).collect();
    let unique: HashSet<_> = live.iter().copied().collect();
    assert_eq!(live.len(), unique.len());
    let active = session.active_tab_id().unwrap();
    assert!(live.contains(&active));
}

#[test]
fn closing_sole_tab_synthesizes_untitled_replacement() {
    let mut session = session();
    let original = session.active_tab_id().unwrap();
    session.rename_tab(original, "X");
    session.set_language(original, "markdown");

    session.close_tab(original);

    assert_eq!(session.tabs().len(), 1);
    let replacement = session.active_tab().unwrap();
    assert_ne!(replacement.id, original);
    assert_eq!(replacement.name, "");
    assert_eq!(replacement.display_name(), UNTITLED);
    // Replacement keeps the closed tab's language but the default color.
    assert_eq!(replacement.language, "markdown");
    assert!(replacement.color.is_default());
    // The closed tab went into history.
    assert_eq!(session.history()[0].name, "X");
}

#[test]
fn close_middle_tab_activates_the_tab_at_its_former_index() {
    let mut session = session();
    let a = session.active_tab_id().unwrap();
    session.rename_tab(a, "A");
    let b = session.create_tab(named("B"));
    let c = session.create_tab(named("C"));
    session.activate(b);

    session.close_tab(b);

    let names: Vec<_> = session.tabs().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(session.active_tab_id(), Some(c));
}

#[test]
fn close_last_positioned_tab_activates_previous() {
    let mut session = session();
    let b = session.create_tab(named("B"));
    let c = session.create_tab(named("C"));

    session.close_tab(c);
    assert_eq!(session.active_tab_id(), Some(b));
}

#[test]
fn closing_inactive_tab_keeps_current_activation_and_binding() {
    let mut session = session();
    let first = session.active_tab_id().unwrap();
    let second = session.create_tab(named("second"));
    let bound_before = session.surface_mut().bound();

    session.close_tab(first);

    assert_eq!(session.active_tab_id(), Some(second));
    assert_eq!(session.surface_mut().bound(), bound_before);
}

// ============================================================================
// History round trip
// ============================================================================

#[test]
fn close_then_reopen_restores_everything_under_a_new_id() {
    let mut session = session();
    let id = session.create_tab(NewTabOptions {
        name: Some("Notes".to_string()),
        language: Some("markdown".to_string()),
        content: Some("# hi".to_string()),
        color: None,
    });

    session.close_tab(id);
    assert!(!session.tabs().iter().any(|t| t.id == id));
    assert!(!session.store().contains(&keys::content_key(id)));

    let reopened = session.reopen(None).unwrap();
    assert_ne!(reopened, id);
    let tab = session.active_tab().unwrap();
    assert_eq!(tab.id, reopened);
    assert_eq!(tab.name, "Notes");
    assert_eq!(tab.language, "markdown");
    let content = session
        .store()
        .get(&keys::content_key(reopened))
        .unwrap();
    assert_eq!(content, "# hi");
    // The entry is consumed.
    assert!(session.history().iter().all(|e| e.name != "Notes"));
}

#[test]
fn closed_dirty_tab_snapshots_live_buffer_content() {
    let mut session = session();
    let id = session.active_tab_id().unwrap();
    session.rename_tab(id, "X");
    let handle = session.active_buffer().unwrap();
    // Simulate typing that has not flushed yet.
    session.surface_mut().set_content(handle, "draft");
    session.note_content_changed(std::time::Instant::now());
    assert!(session.active_tab().unwrap().dirty);

    session.close_tab(id);

    let entry = &session.history()[0];
    assert_eq!(entry.name, "X");
    assert_eq!(entry.content, "draft");
}

#[test]
fn reopen_specific_history_entry() {
    let mut session = session();
    let a = session.create_tab(named("A"));
    let b = session.create_tab(named("B"));
    session.close_tab(a);
    session.close_tab(b);

    // History is newest-first: [B, A]. Reopen A by id.
    let a_entry = session.history()[1].history_id;
    session.reopen(Some(a_entry)).unwrap();
    assert_eq!(session.active_tab().unwrap().name, "A");
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].name, "B");
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn activation_rebinds_surface_and_restores_language() {
    let mut session = session();
    let rust_tab = session.create_tab(NewTabOptions {
        name: Some("lib.rs".to_string()),
        language: Some("rust".to_string()),
        content: Some("fn main() {}".to_string()),
        color: None,
    });
    let md_tab = session.create_tab(NewTabOptions {
        name: Some("notes".to_string()),
        language: Some("markdown".to_string()),
        ..NewTabOptions::default()
    });

    session.activate(rust_tab);
    let bound = session.surface_mut().bound().unwrap();
    assert_eq!(session.active_buffer(), Some(bound));
    assert_eq!(session.surface_mut().language_of(bound), Some("rust"));
    // Cursor lands at the end of the seeded content, with focus.
    assert_eq!(session.surface_mut().cursor(), Some("fn main() {}".len()));
    assert!(session.surface_mut().focused());

    session.activate(md_tab);
    let bound = session.surface_mut().bound().unwrap();
    assert_eq!(session.surface_mut().language_of(bound), Some("markdown"));
}

#[test]
fn activating_unknown_id_is_ignored() {
    let mut session = session();
    let active = session.active_tab_id();
    let ghost = session.create_tab(named("ghost"));
    session.close_tab(ghost);

    session.activate(ghost);
    assert_eq!(session.active_tab_id(), active);
}

#[test]
fn numeric_jump_nine_means_last_on_a_five_tab_registry() {
    let mut session = session();
    for i in 0..4 {
        session.create_tab(named(&format!("t{i}")));
    }
    assert_eq!(session.tabs().len(), 5);
    let last = session.tabs()[4].id;
    let first = session.tabs()[0].id;

    session.jump_to(1);
    assert_eq!(session.active_tab_id(), Some(first));
    session.jump_to(9);
    assert_eq!(session.active_tab_id(), Some(last));
    // Out-of-range ordinals are ignored.
    session.jump_to(7);
    assert_eq!(session.active_tab_id(), Some(last));
}

#[test]
fn activation_commits_pending_rename_on_another_tab() {
    let mut session = session();
    let first = session.active_tab_id().unwrap();
    let second = session.create_tab(named("second"));

    session.activate(first);
    session.begin_rename(first);
    session.rename_input("Renamed First");
    session.activate(second);

    assert_eq!(session.rename_target(), None);
    let first_tab = session.tabs().iter().find(|t| t.id == first).unwrap();
    assert_eq!(first_tab.name, "Renamed First");
}

// ============================================================================
// Metadata mutation
// ============================================================================

#[test]
fn color_input_normalizes_to_the_palette() {
    let mut session = session();
    let id = session.active_tab_id().unwrap();

    session.set_color(id, "#FF0000");
    let color = session.active_tab().unwrap().color;
    assert_eq!(color.hex(), "#ef4444");

    session.set_color(id, "definitely not a color");
    assert!(session.active_tab().unwrap().color.is_default());

    session.cycle_color(id);
    assert!(!session.active_tab().unwrap().color.is_default());
    session.reset_color(id);
    assert!(session.active_tab().unwrap().color.is_default());
}

#[test]
fn set_language_updates_live_buffer() {
    let mut session = session();
    let id = session.active_tab_id().unwrap();
    let handle = session.active_buffer().unwrap();

    session.set_language(id, "json");
    assert_eq!(session.active_tab().unwrap().language, "json");
    assert_eq!(session.surface_mut().language_of(handle), Some("json"));
}

#[test]
fn move_tab_reorders_and_survives_in_metadata() {
    let mut session = session();
    let a = session.active_tab_id().unwrap();
    session.rename_tab(a, "A");
    session.create_tab(named("B"));
    session.create_tab(named("C"));

    session.move_tab(a, 2);
    let names: Vec<_> = session.tabs().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C", "A"]);

    let raw = session.store().get(keys::TABS_META).unwrap();
    let metas: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    let persisted: Vec<_> = metas.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(persisted, vec!["B", "C", "A"]);
}

#[test]
fn default_language_preference_applies_to_new_tabs() {
    let mut session = session();
    session.set_default_language("rust");
    let id = session.create_tab(NewTabOptions::default());
    let tab = session.tabs().iter().find(|t| t.id == id).unwrap();
    assert_eq!(tab.language, "rust");
}

