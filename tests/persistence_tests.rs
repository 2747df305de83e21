//! Tests for session rehydration and storage degradation
//!
//! A session must come back from a cold start with its tabs, ordering,
//! active selection, content, history, and preferences intact — and must
//! come back from corrupt or tampered storage with safe defaults instead of
//! failing initialization.

use quickpad::history::MAX_HISTORY;
use quickpad::session::{NewTabOptions, Session};
use quickpad::surface::{EditorSurface, HeadlessSurface};
use quickpad::{FileStore, KeyValueStore, MemoryStore, keys};
use tempfile::tempdir;

fn file_session(root: &std::path::Path) -> Session<FileStore, HeadlessSurface> {
    Session::init(FileStore::open(root).unwrap(), HeadlessSurface::new())
}

fn named(name: &str) -> NewTabOptions {
    NewTabOptions {
        name: Some(name.to_string()),
        ..NewTabOptions::default()
    }
}

#[test]
fn reload_restores_tabs_active_selection_and_content() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");

    let first_run = {
        let mut session = file_session(&root);
        let a = session.active_tab_id().unwrap();
        session.rename_tab(a, "Alpha");
        let b = session.create_tab(NewTabOptions {
            name: Some("Beta".to_string()),
            language: Some("rust".to_string()),
            content: Some("fn beta() {}".to_string()),
            color: None,
        });
        session.set_color(b, "#3b82f6");
        session.activate(b);
        session.teardown().unwrap();
        b
    };

    let mut session = file_session(&root);
    let names: Vec<_> = session.tabs().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
    assert_eq!(session.active_tab_id(), Some(first_run));
    assert_eq!(session.active_tab().unwrap().language, "rust");
    assert_eq!(session.active_tab().unwrap().color.hex(), "#3b82f6");
    // The active tab's buffer is rebound and seeded from disk.
    let handle = session.active_buffer().unwrap();
    assert_eq!(
        session.surface_mut().buffer_content(handle).as_deref(),
        Some("fn beta() {}")
    );
    // Dirty never survives a reload.
    assert!(session.tabs().iter().all(|t| !t.dirty));
}

#[test]
fn reload_restores_history_and_theme() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");

    {
        let mut session = file_session(&root);
        session.set_theme("dusk");
        session.set_default_language("markdown");
        let id = session.create_tab(NewTabOptions {
            name: Some("Scrap".to_string()),
            content: Some("scrap content".to_string()),
            ..NewTabOptions::default()
        });
        session.close_tab(id);
        session.teardown().unwrap();
    }

    let mut session = file_session(&root);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].name, "Scrap");
    assert_eq!(session.history()[0].content, "scrap content");
    assert_eq!(session.surface_mut().theme(), Some("dusk"));
    assert_eq!(session.language_for_new_tabs(), "markdown");
}

#[test]
fn fresh_store_bootstraps_exactly_one_untitled_tab() {
    let temp = tempdir().unwrap();
    let session = file_session(&temp.path().join("store"));
    assert_eq!(session.tabs().len(), 1);
    let tab = session.active_tab().unwrap();
    assert_eq!(tab.name, "");
    // The content entry was seeded at creation.
    assert!(session.store().contains(&keys::content_key(tab.id)));
}

#[test]
fn corrupt_metadata_falls_back_to_a_fresh_tab() {
    let mut store = MemoryStore::new();
    store.set(keys::TABS_META, "{{{ definitely not json").unwrap();
    store.set(keys::CLOSED_HISTORY, "also broken").unwrap();
    store.set(keys::ACTIVE_TAB_ID, "garbage").unwrap();

    let session = Session::init(store, HeadlessSurface::new());
    assert_eq!(session.tabs().len(), 1);
    assert!(session.history().is_empty());
    assert!(session.active_tab_id().is_some());
}

#[test]
fn dangling_active_id_falls_back_to_first_tab() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");
    {
        let mut session = file_session(&root);
        session.rename_tab(session.active_tab_id().unwrap(), "first");
        session.create_tab(named("second"));
        session.teardown().unwrap();
    }
    // Tamper: point the active id at a tab that does not exist.
    {
        let mut raw = FileStore::open(&root).unwrap();
        raw.set(keys::ACTIVE_TAB_ID, "3d1ecf6a-0000-0000-0000-000000000000")
            .unwrap();
    }

    let session = file_session(&root);
    assert_eq!(
        session.active_tab_id(),
        Some(session.tabs()[0].id),
        "dangling active id resolves to the first tab"
    );
}

#[test]
fn missing_content_key_is_reseeded_on_load() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");
    let id = {
        let mut session = file_session(&root);
        let id = session.active_tab_id().unwrap();
        session.teardown().unwrap();
        id
    };
    {
        let mut raw = FileStore::open(&root).unwrap();
        raw.remove(&keys::content_key(id));
    }

    let session = file_session(&root);
    assert!(session.store().contains(&keys::content_key(id)));
}

#[test]
fn teardown_flushes_unsaved_content_for_the_next_run() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");
    let id = {
        let mut session = file_session(&root);
        let id = session.active_tab_id().unwrap();
        let handle = session.active_buffer().unwrap();
        session.surface_mut().set_content(handle, "typed then quit");
        session.note_content_changed(std::time::Instant::now());
        // Quit before the debounce window elapses.
        session.teardown().unwrap();
        id
    };

    let session = file_session(&root);
    assert_eq!(
        session.store().get(&keys::content_key(id)).as_deref(),
        Some("typed then quit")
    );
}

#[test]
fn history_bound_holds_across_reload() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("store");
    {
        let mut session = file_session(&root);
        for i in 0..MAX_HISTORY + 5 {
            let id = session.create_tab(named(&format!("tab {i}")));
            session.close_tab(id);
        }
        session.teardown().unwrap();
    }

    let session = file_session(&root);
    assert_eq!(session.history().len(), MAX_HISTORY);
    // Newest first; the oldest five snapshots were evicted.
    assert_eq!(session.history()[0].name, format!("tab {}", MAX_HISTORY + 4));
    assert_eq!(
        session.history().last().unwrap().name,
        "tab 5".to_string()
    );
}
