/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Instant;

use canvasshell::geometry::rects_intersect;
use canvasshell::manager::layout::cascade_rects;
use canvasshell::{CanvasApp, WindowAction};

fn app_with_windows(count: usize) -> CanvasApp {
    let mut app = CanvasApp::new_for_testing();
    let now = Instant::now();
    for _ in 0..count {
        app.dispatch(WindowAction::create_default(), now);
    }
    app
}

#[test]
fn cascade_only_moves_selected_windows() {
    let mut app = app_with_windows(3);
    let now = Instant::now();
    let ids: Vec<_> = app.state().windows.iter().map(|w| w.id).collect();
    let untouched = app.state().windows[1].rect();

    app.dispatch(WindowAction::SelectWindow(ids[0]), now);
    app.dispatch(WindowAction::SelectWindow(ids[2]), now);
    app.dispatch(WindowAction::CascadeWindows, now);

    let expected = cascade_rects(2);
    let state = app.state();
    assert_eq!(state.window(ids[0]).unwrap().rect(), expected[0]);
    assert_eq!(state.window(ids[2]).unwrap().rect(), expected[1]);
    assert_eq!(state.window(ids[1]).unwrap().rect(), untouched);
}

#[test]
fn tile_without_selection_leaves_no_overlap() {
    let mut app = app_with_windows(5);
    let now = Instant::now();
    app.dispatch(WindowAction::TileWindows, now);

    let rects: Vec<_> = app.state().windows.iter().map(|w| w.rect()).collect();
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!rects_intersect(a, b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn minimized_windows_stay_out_of_layouts() {
    let mut app = app_with_windows(3);
    let now = Instant::now();
    let minimized = app.state().windows[0].id;
    app.dispatch(WindowAction::MinimizeWindow(minimized), now);
    let before = app.state().window(minimized).unwrap().rect();

    app.dispatch(WindowAction::CascadeWindows, now);

    let state = app.state();
    assert_eq!(state.window(minimized).unwrap().rect(), before);
    let expected = cascade_rects(2);
    assert_eq!(state.windows[1].rect(), expected[0]);
    assert_eq!(state.windows[2].rect(), expected[1]);
}

#[test]
fn layout_is_undone_in_one_step() {
    let mut app = app_with_windows(4);
    let now = Instant::now();
    let before: Vec<_> = app.state().windows.iter().map(|w| w.rect()).collect();

    app.dispatch(WindowAction::GridArrangeWindows, now);
    app.undo(now);

    let after: Vec<_> = app.state().windows.iter().map(|w| w.rect()).collect();
    assert_eq!(before, after);
}
