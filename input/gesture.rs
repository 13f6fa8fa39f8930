/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pointer gestures: window drag, window resize, selection box and canvas pan.
//!
//! A gesture starts on pointer-down and captures the starting geometry.
//! Pointer-moves emit live (unrecorded) updates; pointer-up or pointer-leave
//! emits a single committing action, however many live updates came before.

use euclid::{Point2D, Rect, Size2D};
use keyboard_types::Modifiers;
use log::debug;

use super::has_ctrl_or_meta;
use crate::geometry::{
    self, CANVAS_SIZE, CanvasPoint, CanvasRect, CanvasVector, ViewportPoint, ViewportRect,
    ViewportSize, ViewportVector,
};
use crate::manager::{WindowAction, WindowManagerState};
use crate::model::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Which edge or corner of a window is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::North,
        ResizeHandle::South,
        ResizeHandle::East,
        ResizeHandle::West,
        ResizeHandle::NorthEast,
        ResizeHandle::NorthWest,
        ResizeHandle::SouthEast,
        ResizeHandle::SouthWest,
    ];

    fn west(self) -> bool {
        matches!(
            self,
            ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest
        )
    }

    fn east(self) -> bool {
        matches!(
            self,
            ResizeHandle::East | ResizeHandle::NorthEast | ResizeHandle::SouthEast
        )
    }

    fn north(self) -> bool {
        matches!(
            self,
            ResizeHandle::North | ResizeHandle::NorthEast | ResizeHandle::NorthWest
        )
    }

    fn south(self) -> bool {
        matches!(
            self,
            ResizeHandle::South | ResizeHandle::SouthEast | ResizeHandle::SouthWest
        )
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    TitleBar(WindowId),
    ResizeHandle(WindowId, ResizeHandle),
    /// Canvas background, not covered by any window.
    Canvas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub target: PointerTarget,
    pub button: PointerButton,
    pub position: ViewportPoint,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Move {
        id: WindowId,
        start_pointer: ViewportPoint,
        start_origin: CanvasPoint,
        last_origin: CanvasPoint,
    },
    Resize {
        id: WindowId,
        handle: ResizeHandle,
        start_pointer: ViewportPoint,
        start_rect: CanvasRect,
        last_rect: CanvasRect,
    },
    SelectBox {
        anchor: ViewportPoint,
        current: ViewportPoint,
    },
    Pan {
        start_pointer: ViewportPoint,
        start_pan: ViewportVector,
        last_pan: ViewportVector,
    },
}

/// Screen delta since the gesture started, in canvas units.
fn canvas_delta(from: ViewportPoint, to: ViewportPoint, zoom: f64) -> CanvasVector {
    ((to - from) / zoom).cast_unit()
}

/// One axis of a resize. Returns `(position, extent)`, keeping `last` when
/// the candidate extent would fall below `min`.
fn resize_axis(
    start: (f64, f64),
    last: (f64, f64),
    delta: f64,
    grows_toward_origin: bool,
    grows_away: bool,
    min: f64,
) -> (f64, f64) {
    let (pos, extent) = start;
    let candidate = if grows_toward_origin {
        (pos + delta, extent - delta)
    } else if grows_away {
        (pos, extent + delta)
    } else {
        (pos, extent)
    };
    if candidate.1 >= min { candidate } else { last }
}

/// Rectangle for a resize drag. Each axis freezes independently at its last
/// valid value when it would go under the minimum window size.
pub fn resize_rect(
    handle: ResizeHandle,
    start: CanvasRect,
    last: CanvasRect,
    delta: CanvasVector,
) -> CanvasRect {
    let (x, width) = resize_axis(
        (start.origin.x, start.size.width),
        (last.origin.x, last.size.width),
        delta.x,
        handle.west(),
        handle.east(),
        MIN_WINDOW_WIDTH,
    );
    let (y, height) = resize_axis(
        (start.origin.y, start.size.height),
        (last.origin.y, last.size.height),
        delta.y,
        handle.north(),
        handle.south(),
        MIN_WINDOW_HEIGHT,
    );
    Rect::new(Point2D::new(x, y), Size2D::new(width, height))
}

/// Tracks at most one pointer gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    gesture: Option<Gesture>,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// The rubber band being drawn, in viewport coordinates.
    pub fn selection_box(&self) -> Option<ViewportRect> {
        match self.gesture {
            Some(Gesture::SelectBox { anchor, current }) => Some(geometry::normalize_rect(
                Rect::new(anchor, (current - anchor).to_size()),
            )),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, state: &WindowManagerState, press: &PointerPress) -> Vec<WindowAction> {
        let mut actions = Vec::new();
        if self.gesture.is_some() {
            debug!("Pointer down during a gesture; committing the old one");
            actions.extend(self.pointer_leave(state));
        }

        if press.button == PointerButton::Middle {
            let pan = state.canvas.pan();
            self.gesture = Some(Gesture::Pan {
                start_pointer: press.position,
                start_pan: pan,
                last_pan: pan,
            });
            return actions;
        }
        if press.button != PointerButton::Primary {
            return actions;
        }

        match press.target {
            PointerTarget::TitleBar(id) => {
                let Some(window) = state.window(id) else {
                    return actions;
                };
                if has_ctrl_or_meta(press.modifiers) {
                    actions.push(WindowAction::ToggleWindowSelection(id));
                    return actions;
                }
                actions.push(WindowAction::FocusWindow(id));
                if !window.is_maximized {
                    self.gesture = Some(Gesture::Move {
                        id,
                        start_pointer: press.position,
                        start_origin: window.origin(),
                        last_origin: window.origin(),
                    });
                }
            },
            PointerTarget::ResizeHandle(id, handle) => {
                if let Some(window) = state.window(id)
                    && !window.is_maximized
                {
                    self.gesture = Some(Gesture::Resize {
                        id,
                        handle,
                        start_pointer: press.position,
                        start_rect: window.rect(),
                        last_rect: window.rect(),
                    });
                }
            },
            PointerTarget::Canvas => {
                if state.modes.selection_mode {
                    self.gesture = Some(Gesture::SelectBox {
                        anchor: press.position,
                        current: press.position,
                    });
                }
            },
        }
        actions
    }

    /// Live update for the gesture in progress.
    pub fn pointer_move(
        &mut self,
        state: &WindowManagerState,
        position: ViewportPoint,
        viewport: ViewportSize,
    ) -> Option<WindowAction> {
        let zoom = state.canvas.zoom;
        match self.gesture.as_mut()? {
            Gesture::Move {
                id,
                start_pointer,
                start_origin,
                last_origin,
            } => {
                let origin = *start_origin + canvas_delta(*start_pointer, position, zoom);
                if origin == *last_origin {
                    return None;
                }
                *last_origin = origin;
                Some(WindowAction::MoveWindow { id: *id, origin })
            },
            Gesture::Resize {
                id,
                handle,
                start_pointer,
                start_rect,
                last_rect,
            } => {
                let delta = canvas_delta(*start_pointer, position, zoom);
                let rect = resize_rect(*handle, *start_rect, *last_rect, delta);
                if rect == *last_rect {
                    return None;
                }
                *last_rect = rect;
                Some(WindowAction::ResizeWindow { id: *id, rect })
            },
            Gesture::SelectBox { current, .. } => {
                *current = position;
                None
            },
            Gesture::Pan {
                start_pointer,
                start_pan,
                last_pan,
            } => {
                let pan = geometry::clamp_pan(
                    *start_pan + (position - *start_pointer),
                    zoom,
                    viewport,
                    CANVAS_SIZE,
                );
                if pan == *last_pan {
                    return None;
                }
                *last_pan = pan;
                Some(WindowAction::SetPan(pan))
            },
        }
    }

    /// Finish the gesture at `position`.
    pub fn pointer_up(
        &mut self,
        state: &WindowManagerState,
        position: ViewportPoint,
        viewport: ViewportSize,
    ) -> Option<WindowAction> {
        let live = self.pointer_move(state, position, viewport);
        if matches!(self.gesture, Some(Gesture::Pan { .. })) {
            self.gesture = None;
            return live;
        }
        self.pointer_leave(state)
    }

    /// Finish the gesture where the pointer was last seen.
    pub fn pointer_leave(&mut self, state: &WindowManagerState) -> Option<WindowAction> {
        match self.gesture.take()? {
            Gesture::Move {
                id,
                start_origin,
                last_origin,
                ..
            } => (last_origin != start_origin).then_some(WindowAction::MoveWindowEnd {
                id,
                origin: last_origin,
            }),
            Gesture::Resize {
                id,
                start_rect,
                last_rect,
                ..
            } => (last_rect != start_rect).then_some(WindowAction::ResizeWindowEnd {
                id,
                rect: last_rect,
            }),
            Gesture::SelectBox { anchor, current } => {
                let rect = Rect::new(anchor, (current - anchor).to_size());
                Some(WindowAction::SelectWindowsInRect(geometry::to_canvas_rect(
                    rect,
                    &state.canvas,
                )))
            },
            Gesture::Pan { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::WindowManager;
    use proptest::prelude::*;

    fn viewport() -> ViewportSize {
        ViewportSize::new(1200.0, 800.0)
    }

    fn manager_with_window() -> (WindowManager, WindowId) {
        let mut manager = WindowManager::new();
        manager.dispatch(WindowAction::create_default());
        let id = manager.state().windows[0].id;
        (manager, id)
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
    fn test_title_bar_drag_scales_by_zoom_and_commits_once() {
        let (manager, id) = manager_with_window();
        let state = manager.state();
        let zoom = state.canvas.zoom;
        let start = state.windows[0].origin();
        let mut gestures = GestureController::new();

        let down = gestures.pointer_down(state, &press(PointerTarget::TitleBar(id), 100.0, 100.0));
        assert_eq!(down, vec![WindowAction::FocusWindow(id)]);

        let mut live = 0;
        for step in 1..=5 {
            let position = ViewportPoint::new(100.0 + 10.0 * step as f64, 100.0);
            if let Some(WindowAction::MoveWindow { .. }) = gestures.pointer_move(state, position, viewport()) {
                live += 1;
            }
        }
        assert_eq!(live, 5);

        let end = gestures.pointer_up(state, ViewportPoint::new(150.0, 100.0), viewport());
        assert_eq!(
            end,
            Some(WindowAction::MoveWindowEnd {
                id,
                origin: start + CanvasVector::new(50.0 / zoom, 0.0),
            })
        );
        assert!(!gestures.is_active());
        assert_eq!(gestures.pointer_leave(state), None);
    }

    #[test]
    fn test_click_without_drag_commits_nothing() {
        let (manager, id) = manager_with_window();
        let mut gestures = GestureController::new();
        gestures.pointer_down(manager.state(), &press(PointerTarget::TitleBar(id), 5.0, 5.0));
        assert_eq!(gestures.pointer_up(manager.state(), ViewportPoint::new(5.0, 5.0), viewport()), None);
    }

    #[test]
    fn test_ctrl_click_toggles_selection_without_drag() {
        let (manager, id) = manager_with_window();
        let mut gestures = GestureController::new();
        let mut click = press(PointerTarget::TitleBar(id), 5.0, 5.0);
        click.modifiers = Modifiers::CONTROL;
        assert_eq!(
            gestures.pointer_down(manager.state(), &click),
            vec![WindowAction::ToggleWindowSelection(id)]
        );
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_maximized_window_focuses_but_does_not_move_or_resize() {
        let (mut manager, id) = manager_with_window();
        manager.dispatch(WindowAction::MaximizeWindow(id));
        let mut gestures = GestureController::new();
        let down = gestures.pointer_down(manager.state(), &press(PointerTarget::TitleBar(id), 5.0, 5.0));
        assert_eq!(down, vec![WindowAction::FocusWindow(id)]);
        assert!(!gestures.is_active());

        let down = gestures.pointer_down(
            manager.state(),
            &press(PointerTarget::ResizeHandle(id, ResizeHandle::SouthEast), 5.0, 5.0),
        );
        assert!(down.is_empty());
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_resize_freezes_axes_independently() {
        let start = CanvasRect::new(Point2D::new(1000.0, 1000.0), Size2D::new(1400.0, 900.0));

        // West edge dragged too far: x and width stay put.
        let rect = resize_rect(ResizeHandle::West, start, start, CanvasVector::new(1200.0, 0.0));
        assert_eq!(rect, start);

        // Width invalid, height valid: only the height follows the pointer.
        let rect = resize_rect(
            ResizeHandle::SouthWest,
            start,
            start,
            CanvasVector::new(1200.0, 100.0),
        );
        assert_eq!(rect.origin, start.origin);
        assert_eq!(rect.size, Size2D::new(1400.0, 1000.0));

        // Frozen at the last valid value, not the starting one.
        let last = resize_rect(ResizeHandle::North, start, start, CanvasVector::new(0.0, 300.0));
        assert_eq!(last.origin.y, 1300.0);
        assert_eq!(last.size.height, 600.0);
        let rect = resize_rect(ResizeHandle::North, start, last, CanvasVector::new(0.0, 700.0));
        assert_eq!(rect, last);
    }

    #[test]
    fn test_resize_gesture_commits_last_valid_rect() {
        let (manager, id) = manager_with_window();
        let state = manager.state();
        let zoom = state.canvas.zoom;
        let start = state.windows[0].rect();
        let mut gestures = GestureController::new();
        gestures.pointer_down(
            state,
            &press(PointerTarget::ResizeHandle(id, ResizeHandle::East), 0.0, 0.0),
        );
        // Shrink by 500 canvas units, then try to go below the minimum.
        gestures.pointer_move(state, ViewportPoint::new(-500.0 * zoom, 0.0), viewport());
        assert_eq!(
            gestures.pointer_move(state, ViewportPoint::new(-5000.0 * zoom, 0.0), viewport()),
            None
        );
        let end = gestures.pointer_leave(state);
        let Some(WindowAction::ResizeWindowEnd { id: ended, rect }) = end else {
            panic!("expected a resize commit, got {end:?}");
        };
        assert_eq!(ended, id);
        assert_eq!(rect.origin, start.origin);
        assert_eq!(rect.size.width, start.size.width - 500.0);
    }

    #[test]
    fn test_selection_box_converts_to_canvas() {
        let (mut manager, _) = manager_with_window();
        manager.dispatch(WindowAction::ToggleSelectionMode);
        let state = manager.state();
        let mut gestures = GestureController::new();
        gestures.pointer_down(state, &press(PointerTarget::Canvas, 500.0, 400.0));
        gestures.pointer_move(state, ViewportPoint::new(300.0, 200.0), viewport());
        let drawn = ViewportRect::new(Point2D::new(300.0, 200.0), Size2D::new(200.0, 200.0));
        assert_eq!(gestures.selection_box(), Some(drawn));

        let end = gestures.pointer_up(state, ViewportPoint::new(300.0, 200.0), viewport());
        assert_eq!(
            end,
            Some(WindowAction::SelectWindowsInRect(geometry::to_canvas_rect(
                drawn,
                &state.canvas
            )))
        );
    }

    #[test]
    fn test_canvas_drag_outside_selection_mode_does_nothing() {
        let (manager, _) = manager_with_window();
        let mut gestures = GestureController::new();
        assert!(gestures
            .pointer_down(manager.state(), &press(PointerTarget::Canvas, 10.0, 10.0))
            .is_empty());
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_middle_button_pans_with_clamp() {
        let (manager, id) = manager_with_window();
        let state = manager.state();
        let start_pan = state.canvas.pan();
        let mut gestures = GestureController::new();
        let mut middle = press(PointerTarget::TitleBar(id), 0.0, 0.0);
        middle.button = PointerButton::Middle;
        assert!(gestures.pointer_down(state, &middle).is_empty());

        assert_eq!(
            gestures.pointer_move(state, ViewportPoint::new(50.0, 30.0), viewport()),
            Some(WindowAction::SetPan(start_pan + ViewportVector::new(50.0, 30.0)))
        );
        // Far enough to hit the canvas edge.
        let far = ViewportPoint::new(1.0e6, 1.0e6);
        assert_eq!(
            gestures.pointer_move(state, far, viewport()),
            Some(WindowAction::SetPan(ViewportVector::zero()))
        );
        assert_eq!(gestures.pointer_up(state, far, viewport()), None);
        assert!(!gestures.is_active());
    }

    proptest! {
        #[test]
        fn proptest_resize_never_goes_below_minimum(
            handle in 0usize..8,
            moves in proptest::collection::vec((-4000.0f64..4000.0, -4000.0f64..4000.0), 1..20),
        ) {
            let (manager, id) = manager_with_window();
            let state = manager.state();
            let mut gestures = GestureController::new();
            gestures.pointer_down(
                state,
                &press(PointerTarget::ResizeHandle(id, ResizeHandle::ALL[handle]), 0.0, 0.0),
            );
            for (x, y) in moves {
                if let Some(WindowAction::ResizeWindow { rect, .. }) =
                    gestures.pointer_move(state, ViewportPoint::new(x, y), viewport())
                {
                    prop_assert!(rect.size.width >= MIN_WINDOW_WIDTH);
                    prop_assert!(rect.size.height >= MIN_WINDOW_HEIGHT);
                }
            }
            if let Some(WindowAction::ResizeWindowEnd { rect, .. }) = gestures.pointer_leave(state) {
                prop_assert!(rect.size.width >= MIN_WINDOW_WIDTH);
                prop_assert!(rect.size.height >= MIN_WINDOW_HEIGHT);
            }
        }
    }
}
