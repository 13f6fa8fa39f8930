/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Instant;

use canvasshell::geometry::{ViewportPoint, ViewportSize, ViewportVector};
use canvasshell::input::gesture::PointerPress;
use canvasshell::input::{PointerButton, PointerTarget, ResizeHandle};
use canvasshell::prefs::CanvasPreferences;
use canvasshell::{CanvasApp, WindowAction, WindowManagerState};
use keyboard_types::Modifiers;
use proptest::prelude::*;

fn app_with_viewport() -> CanvasApp {
    let mut app = CanvasApp::new_for_testing();
    let now = Instant::now();
    app.set_viewport(ViewportSize::new(1280.0, 800.0), now);
    app.dispatch(WindowAction::create_default(), now);
    app
}

fn press(target: PointerTarget, x: f64, y: f64) -> PointerPress {
    PointerPress {
        target,
        button: PointerButton::Primary,
        position: ViewportPoint::new(x, y),
        modifiers: Modifiers::empty(),
    }
}

#[test]
fn drag_with_live_updates_is_a_single_undo_step() {
    let mut app = app_with_viewport();
    let now = Instant::now();
    let id = app.state().windows[0].id;
    let start = app.state().windows[0].origin();
    let steps_before = app.history().past_len();

    app.pointer_down(&press(PointerTarget::TitleBar(id), 200.0, 200.0), now);
    for step in 1..=5 {
        let offset = step as f64 * 12.0;
        app.pointer_move(ViewportPoint::new(200.0 + offset, 200.0 + offset), now);
    }
    app.pointer_up(ViewportPoint::new(260.0, 260.0), now);

    assert_eq!(app.history().past_len(), steps_before + 1);
    let moved = app.state().windows[0].origin();
    assert!(moved.x > start.x && moved.y > start.y);

    assert!(app.undo(now));
    assert_eq!(app.state().windows[0].origin(), start);
    assert!(app.redo(now));
    assert_eq!(app.state().windows[0].origin(), moved);
}

#[test]
fn resize_from_corner_is_a_single_undo_step() {
    let mut app = app_with_viewport();
    let now = Instant::now();
    let id = app.state().windows[0].id;
    let start = app.state().windows[0].rect();
    let steps_before = app.history().past_len();

    app.pointer_down(
        &press(PointerTarget::ResizeHandle(id, ResizeHandle::SouthEast), 500.0, 500.0),
        now,
    );
    app.pointer_move(ViewportPoint::new(540.0, 520.0), now);
    app.pointer_move(ViewportPoint::new(580.0, 540.0), now);
    app.pointer_up(ViewportPoint::new(580.0, 540.0), now);

    assert_eq!(app.history().past_len(), steps_before + 1);
    let resized = app.state().windows[0].rect();
    assert_eq!(resized.origin, start.origin);
    assert!(resized.size.width > start.size.width);

    app.undo(now);
    assert_eq!(app.state().windows[0].rect(), start);
}

#[test]
fn click_without_drag_records_nothing() {
    let mut app = app_with_viewport();
    let now = Instant::now();
    let id = app.state().windows[0].id;
    let steps_before = app.history().past_len();

    app.pointer_down(&press(PointerTarget::TitleBar(id), 200.0, 200.0), now);
    app.pointer_up(ViewportPoint::new(200.0, 200.0), now);

    assert_eq!(app.history().past_len(), steps_before);
    assert!(!app.gestures().is_active());
}

#[test]
fn history_is_bounded_by_preferences() {
    let prefs = CanvasPreferences {
        history_limit: 3,
        ..CanvasPreferences::default()
    };
    let dir = tempfile::TempDir::new().unwrap();
    let mut app = CanvasApp::new_from_dir(dir.path().to_path_buf(), prefs);
    let now = Instant::now();
    for _ in 0..6 {
        app.dispatch(WindowAction::create_default(), now);
    }
    assert_eq!(app.history().past_len(), 3);

    while app.undo(now) {}
    assert_eq!(app.state().windows.len(), 3);
}

#[test]
fn new_action_after_undo_drops_redo() {
    let mut app = app_with_viewport();
    let now = Instant::now();
    app.dispatch(WindowAction::create_default(), now);
    app.undo(now);
    assert_eq!(app.history().future_len(), 1);

    app.dispatch(WindowAction::TileWindows, now);
    assert_eq!(app.history().future_len(), 0);
    assert!(!app.redo(now));
}

#[derive(Debug, Clone)]
enum Step {
    Create,
    Zoom(f64),
    Pan(f64, f64),
    Select(usize),
    Tile,
    Cascade,
    Drag { pick: usize, dx: f64, back_to_start: bool },
    Undo,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Create),
        (0.1f64..2.0).prop_map(Step::Zoom),
        (-400.0f64..400.0, -400.0f64..400.0).prop_map(|(x, y)| Step::Pan(x, y)),
        (0usize..8).prop_map(Step::Select),
        Just(Step::Tile),
        Just(Step::Cascade),
        (0usize..8, 20.0f64..200.0, any::<bool>()).prop_map(|(pick, dx, back_to_start)| {
            Step::Drag {
                pick,
                dx,
                back_to_start,
            }
        }),
        Just(Step::Undo),
    ]
}

/// Run one step and return the state just before its recordable dispatch.
fn run_step(app: &mut CanvasApp, step: &Step, now: Instant) -> Option<WindowManagerState> {
    let pick_id = |app: &CanvasApp, pick: usize| {
        let windows = &app.state().windows;
        windows[pick % windows.len()].id
    };
    match *step {
        Step::Create => {
            let before = app.state().clone();
            app.dispatch(WindowAction::create_default(), now);
            Some(before)
        },
        Step::Zoom(zoom) => {
            app.dispatch(WindowAction::SetZoom { zoom, pan: None }, now);
            None
        },
        Step::Pan(x, y) => {
            app.dispatch(WindowAction::SetPan(ViewportVector::new(x, y)), now);
            None
        },
        Step::Select(pick) => {
            let id = pick_id(app, pick);
            app.dispatch(WindowAction::SelectWindow(id), now);
            None
        },
        Step::Tile => {
            let before = app.state().clone();
            app.dispatch(WindowAction::TileWindows, now);
            Some(before)
        },
        Step::Cascade => {
            let before = app.state().clone();
            app.dispatch(WindowAction::CascadeWindows, now);
            Some(before)
        },
        Step::Drag {
            pick,
            dx,
            back_to_start,
        } => {
            let id = pick_id(app, pick);
            app.pointer_down(&press(PointerTarget::TitleBar(id), 300.0, 300.0), now);
            let before = app.state().clone();
            app.pointer_move(ViewportPoint::new(300.0 + dx, 300.0), now);
            let end = if back_to_start { 300.0 } else { 300.0 + dx };
            app.pointer_move(ViewportPoint::new(end, 300.0), now);
            app.pointer_up(ViewportPoint::new(end, 300.0), now);
            Some(before)
        },
        Step::Undo => {
            app.undo(now);
            None
        },
    }
}

proptest! {
    #[test]
    fn undo_returns_to_state_before_each_recorded_step(
        steps in prop::collection::vec(step(), 1..30)
    ) {
        let mut app = app_with_viewport();
        let now = Instant::now();
        for step in &steps {
            let depth = app.history().past_len();
            let before = run_step(&mut app, step, now);
            prop_assert!(!app.history().gesture_pending());
            if app.history().past_len() != depth + 1 {
                continue;
            }
            let Some(before) = before else {
                continue;
            };
            let after = app.state().clone();
            prop_assert!(app.undo(now));
            prop_assert_eq!(app.state(), &before, "undo after {:?}", step);
            prop_assert!(app.redo(now));
            prop_assert_eq!(app.state(), &after, "redo after {:?}", step);
        }
    }
}
