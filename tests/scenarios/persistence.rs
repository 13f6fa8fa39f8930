/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::{Duration, Instant};

use canvasshell::geometry::CanvasPoint;
use canvasshell::persistence::CanvasStore;
use canvasshell::prefs::CanvasPreferences;
use canvasshell::{CanvasApp, WindowAction};
use tempfile::TempDir;

fn open(dir: &TempDir) -> CanvasApp {
    CanvasApp::new_from_dir(dir.path().to_path_buf(), CanvasPreferences::default())
}

#[test]
fn workspace_and_history_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let now = Instant::now();
    let (windows, past) = {
        let mut app = open(&dir);
        app.dispatch(WindowAction::create_default(), now);
        app.dispatch(
            WindowAction::CreateWindow {
                origin: Some(CanvasPoint::new(4000.0, 4000.0)),
                size: None,
                url: Some("https://example.com/".to_string()),
            },
            now,
        );
        app.dispatch(WindowAction::TileWindows, now);
        (app.state().windows.clone(), app.history().past_len())
    };

    let mut app = open(&dir);
    assert_eq!(app.state().windows, windows);
    assert_eq!(app.history().past_len(), past);
    assert!(app.undo(now));
    assert_eq!(app.state().windows.len(), 2);
}

#[test]
fn projects_keep_their_own_layouts() {
    let dir = TempDir::new().unwrap();
    let now = Instant::now();
    let (first, second) = {
        let mut app = open(&dir);
        let first = app.create_project("First", now);
        app.dispatch(WindowAction::create_default(), now);
        app.dispatch(WindowAction::create_default(), now);
        let second = app.create_project("Second", now);
        (first, second)
    };

    let mut app = open(&dir);
    assert_eq!(app.current_project_id(), Some(second));
    assert_eq!(app.state().windows.len(), 1);
    assert_eq!(app.projects().len(), 2);

    assert!(app.open_project(first, now));
    assert_eq!(app.current_project_name(), "First");
    assert_eq!(app.state().windows.len(), 3);
    assert!(!app.history().can_undo());
}

#[test]
fn autosave_writes_project_to_disk() {
    let dir = TempDir::new().unwrap();
    let start = Instant::now();
    let id = {
        let mut app = open(&dir);
        let id = app.create_project("Autosaved", start);
        app.dispatch(WindowAction::create_default(), start);
        assert!(app.tick(start + Duration::from_secs(2)));
        id
    };

    let store = CanvasStore::open(dir.path().to_path_buf()).unwrap();
    let project = store.load_project(id).unwrap();
    assert_eq!(project.windows.len(), 2);
    assert_eq!(project.name, "Autosaved");
}

#[test]
fn corrupt_store_directory_falls_back_to_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let mut app = CanvasApp::new_from_dir(blocker, CanvasPreferences::default());
    assert!(!app.has_persistence());
    app.dispatch(WindowAction::create_default(), Instant::now());
    assert_eq!(app.state().windows.len(), 1);
}
