/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Window manager state machine.
//!
//! All mutation goes through [`reduce`], a pure function from the current
//! state and a [`WindowAction`] to the next state. It never fails: unknown
//! ids are ignored and size constraints are clamped. [`WindowManager`] owns
//! the live state and reports what each dispatch did, so the caller can
//! decide whether to record history or persist.

pub mod layout;

use euclid::{Point2D, Rect};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{
    self, CanvasPoint, CanvasRect, CanvasSize, CanvasView, FIT_MAX_ZOOM, FIT_PADDING,
    ViewportSize, ViewportVector,
};
use crate::model::{
    DEFAULT_URL, NEW_WINDOW_STAGGER, Tab, TabPatch, Window, WindowId, WindowPatch,
    clamp_window_size, default_window_position, default_window_size, is_palette_color,
};

/// Independent interaction modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modes {
    pub selection_mode: bool,
    pub window_cursor_mode: bool,
    pub solo_mode: bool,
    pub hide_all_mode: bool,
}

/// Partial update of [`Modes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModesPatch {
    pub selection_mode: Option<bool>,
    pub window_cursor_mode: Option<bool>,
    pub solo_mode: Option<bool>,
    pub hide_all_mode: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionUpdateMode {
    Replace,
    Add,
    Toggle,
}

/// Ordered set of selected windows. Order is selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    order: Vec<WindowId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[WindowId] {
        &self.order
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.order.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn select(&mut self, id: WindowId) {
        if !self.contains(id) {
            self.order.push(id);
        }
    }

    pub fn deselect(&mut self, id: WindowId) {
        self.order.retain(|existing| *existing != id);
    }

    pub fn toggle(&mut self, id: WindowId) {
        if self.contains(id) {
            self.deselect(id);
        } else {
            self.order.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn update_many(&mut self, ids: impl IntoIterator<Item = WindowId>, mode: SelectionUpdateMode) {
        match mode {
            SelectionUpdateMode::Replace => {
                self.order.clear();
                for id in ids {
                    self.select(id);
                }
            },
            SelectionUpdateMode::Add => {
                for id in ids {
                    self.select(id);
                }
            },
            SelectionUpdateMode::Toggle => {
                for id in ids {
                    self.toggle(id);
                }
            },
        }
    }

    /// Drop ids that no longer name a window.
    pub fn retain_existing(&mut self, windows: &[Window]) {
        self.order.retain(|id| windows.iter().any(|w| w.id == *id));
    }
}

/// Tag of a [`WindowAction`], recorded in history snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateWindow,
    CloseWindow,
    FocusWindow,
    MoveWindow,
    MoveWindowEnd,
    ResizeWindow,
    ResizeWindowEnd,
    MaximizeWindow,
    MinimizeWindow,
    RestoreWindow,
    ToggleFullscreen,
    SetWindowColor,
    RenameWindow,
    UpdateWindow,
    DuplicateWindow,
    AddTab,
    CloseTab,
    SwitchTab,
    UpdateTab,
    SelectWindow,
    DeselectWindow,
    ToggleWindowSelection,
    SelectWindowsInRect,
    ClearSelection,
    SelectAllWindows,
    DeleteSelectedWindows,
    CascadeWindows,
    TileWindows,
    GridArrangeWindows,
    SetZoom,
    SetPan,
    ResetZoom,
    InitializeCanvasView,
    ZoomToSelection,
    ToggleSelectionMode,
    ToggleWindowCursorMode,
    ToggleSoloMode,
    ToggleHideAllMode,
    SetModes,
    RestoreState,
    RestoreFromSnapshot,
}

impl ActionKind {
    /// Whether an action of this kind becomes its own undo step. Other
    /// actions still update the present snapshot in place.
    pub fn is_recordable(self) -> bool {
        matches!(
            self,
            ActionKind::CreateWindow
                | ActionKind::CloseWindow
                | ActionKind::DuplicateWindow
                | ActionKind::DeleteSelectedWindows
                | ActionKind::AddTab
                | ActionKind::CloseTab
                | ActionKind::UpdateTab
                | ActionKind::MaximizeWindow
                | ActionKind::MinimizeWindow
                | ActionKind::RestoreWindow
                | ActionKind::SetWindowColor
                | ActionKind::RenameWindow
                | ActionKind::CascadeWindows
                | ActionKind::TileWindows
                | ActionKind::GridArrangeWindows
                | ActionKind::MoveWindowEnd
                | ActionKind::ResizeWindowEnd
                | ActionKind::RestoreState
        )
    }

    /// In-gesture geometry updates that a later `*End` action commits.
    pub fn is_live_update(self) -> bool {
        matches!(self, ActionKind::MoveWindow | ActionKind::ResizeWindow)
    }

    /// Actions that close a move or resize gesture.
    pub fn is_gesture_commit(self) -> bool {
        matches!(self, ActionKind::MoveWindowEnd | ActionKind::ResizeWindowEnd)
    }
}

/// A deep copy of everything undo/redo restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub windows: Vec<Window>,
    pub active_window_id: Option<WindowId>,
    pub canvas: CanvasView,
    pub selected_window_ids: Vec<WindowId>,
    pub next_window_id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub action_type: ActionKind,
}

/// Everything an action can change.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowManagerState {
    pub windows: Vec<Window>,
    pub active_window_id: Option<WindowId>,
    pub canvas: CanvasView,
    pub modes: Modes,
    pub selection: SelectionState,
    /// Counter behind `Window N` names. Never reused.
    pub next_window_id: u64,
}

impl Default for WindowManagerState {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManagerState {
    /// Empty canvas. Until the host reports its viewport size the canvas
    /// centre sits at the viewport origin.
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            active_window_id: None,
            canvas: geometry::initial_view(ViewportSize::zero()),
            modes: Modes::default(),
            selection: SelectionState::new(),
            next_window_id: 0,
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn active_window(&self) -> Option<&Window> {
        self.active_window_id.and_then(|id| self.window(id))
    }

    pub fn max_z(&self) -> u64 {
        self.windows.iter().map(|w| w.z_index).max().unwrap_or(0)
    }

    /// Windows in paint order, bottom first. Equal z keeps insertion order.
    pub fn windows_by_z(&self) -> Vec<&Window> {
        let mut sorted: Vec<&Window> = self.windows.iter().collect();
        sorted.sort_by_key(|w| w.z_index);
        sorted
    }

    /// Topmost window matching `filter`. Among equal z the later-inserted
    /// window wins, matching paint order.
    fn topmost(&self, filter: impl Fn(&Window) -> bool) -> Option<WindowId> {
        self.windows
            .iter()
            .filter(|w| filter(w))
            .fold(None::<&Window>, |best, w| match best {
                Some(b) if b.z_index > w.z_index => Some(b),
                _ => Some(w),
            })
            .map(|w| w.id)
    }

    /// Windows a layout or zoom-to-selection applies to: the non-minimized
    /// selected windows when anything is selected, otherwise every
    /// non-minimized window. Returned in window-list order.
    pub fn layout_targets(&self) -> Vec<WindowId> {
        let use_selection = !self.selection.is_empty();
        self.windows
            .iter()
            .filter(|w| !w.is_minimized)
            .filter(|w| !use_selection || self.selection.contains(w.id))
            .map(|w| w.id)
            .collect()
    }

    pub fn snapshot(&self, action_type: ActionKind, timestamp: u64) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            windows: self.windows.clone(),
            active_window_id: self.active_window_id,
            canvas: self.canvas,
            selected_window_ids: self.selection.ids().to_vec(),
            next_window_id: self.next_window_id,
            timestamp,
            action_type,
        }
    }

    fn spawn_window(&mut self, origin: Option<CanvasPoint>, size: Option<CanvasSize>, url: Option<&str>) -> WindowId {
        let stagger = self.windows.len() as f64 * NEW_WINDOW_STAGGER;
        let origin = origin.unwrap_or_else(|| {
            let base = default_window_position();
            Point2D::new(base.x + stagger, base.y + stagger)
        });
        let size = clamp_window_size(size.unwrap_or_else(default_window_size));
        let name = format!("Window {}", self.next_window_id + 1);
        let window = Window::new(
            name,
            Rect::new(origin, size),
            self.max_z() + 1,
            Tab::new(url.unwrap_or(DEFAULT_URL)),
        );
        let id = window.id;
        self.windows.push(window);
        self.active_window_id = Some(id);
        self.next_window_id += 1;
        id
    }

    /// Keep at least one window alive after a removal.
    fn ensure_not_empty(&mut self) {
        if self.windows.is_empty() {
            self.selection.clear();
            self.spawn_window(None, None, None);
        }
    }

    fn raise(&mut self, id: WindowId) {
        let max_z = self.max_z();
        let already_top = self
            .windows
            .iter()
            .all(|w| w.id == id || w.z_index < max_z);
        if let Some(window) = self.window_mut(id)
            && !(already_top && window.z_index == max_z)
        {
            window.z_index = max_z + 1;
        }
        self.active_window_id = Some(id);
    }

    fn remove_windows(&mut self, doomed: impl Fn(WindowId) -> bool) {
        let active_removed = self.active_window_id.is_some_and(&doomed);
        self.windows.retain(|w| !doomed(w.id));
        self.selection.retain_existing(&self.windows);
        if active_removed {
            self.active_window_id = self.topmost(|_| true);
        }
        self.ensure_not_empty();
    }

    fn arrange(&mut self, targets: &[WindowId], rects: Vec<CanvasRect>) {
        for (id, rect) in targets.iter().zip(rects) {
            if let Some(window) = self.window_mut(*id) {
                window.set_rect(rect);
                window.is_maximized = false;
            }
        }
    }

    fn normalize_window(window: &mut Window) {
        if window.tabs.is_empty() {
            window.tabs.push(Tab::default());
        }
        if window.active_tab_index >= window.tabs.len() {
            window.active_tab_index = window.tabs.len() - 1;
        }
        let size = clamp_window_size(window.size());
        window.width = size.width;
        window.height = size.height;
    }

    fn load_windows(&mut self, windows: &[Window]) {
        self.windows = windows.to_vec();
        for window in &mut self.windows {
            Self::normalize_window(window);
        }
    }

    fn set_selection_mode(&mut self, enabled: bool) {
        if self.modes.selection_mode && !enabled {
            self.selection.clear();
        }
        self.modes.selection_mode = enabled;
    }
}

/// Every mutation the window manager understands.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowAction {
    CreateWindow {
        origin: Option<CanvasPoint>,
        size: Option<CanvasSize>,
        url: Option<String>,
    },
    CloseWindow(WindowId),
    FocusWindow(WindowId),
    /// Live drag update.
    MoveWindow {
        id: WindowId,
        origin: CanvasPoint,
    },
    /// Drag committed.
    MoveWindowEnd {
        id: WindowId,
        origin: CanvasPoint,
    },
    ResizeWindow {
        id: WindowId,
        rect: CanvasRect,
    },
    ResizeWindowEnd {
        id: WindowId,
        rect: CanvasRect,
    },
    MaximizeWindow(WindowId),
    MinimizeWindow(WindowId),
    RestoreWindow(WindowId),
    ToggleFullscreen(WindowId),
    SetWindowColor {
        id: WindowId,
        color: Option<String>,
    },
    RenameWindow {
        id: WindowId,
        name: String,
    },
    /// Sidebar flags. Not an undo step.
    UpdateWindow {
        id: WindowId,
        patch: WindowPatch,
    },
    DuplicateWindow(WindowId),
    AddTab {
        window: WindowId,
        url: Option<String>,
    },
    CloseTab {
        window: WindowId,
        index: usize,
    },
    SwitchTab {
        window: WindowId,
        index: usize,
    },
    UpdateTab {
        window: WindowId,
        index: usize,
        patch: TabPatch,
    },
    SelectWindow(WindowId),
    DeselectWindow(WindowId),
    ToggleWindowSelection(WindowId),
    /// Canvas-space rectangle; may have negative extent.
    SelectWindowsInRect(CanvasRect),
    ClearSelection,
    SelectAllWindows,
    DeleteSelectedWindows,
    CascadeWindows,
    TileWindows,
    GridArrangeWindows,
    SetZoom {
        zoom: f64,
        pan: Option<ViewportVector>,
    },
    SetPan(ViewportVector),
    ResetZoom,
    InitializeCanvasView(ViewportSize),
    ZoomToSelection(ViewportSize),
    ToggleSelectionMode,
    ToggleWindowCursorMode,
    ToggleSoloMode,
    ToggleHideAllMode,
    SetModes(ModesPatch),
    /// Load a saved project layout.
    RestoreState {
        windows: Vec<Window>,
        canvas: CanvasView,
        next_window_id: u64,
    },
    /// Undo/redo target.
    RestoreFromSnapshot(Box<WorkspaceSnapshot>),
}

impl WindowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            WindowAction::CreateWindow { .. } => ActionKind::CreateWindow,
            WindowAction::CloseWindow(_) => ActionKind::CloseWindow,
            WindowAction::FocusWindow(_) => ActionKind::FocusWindow,
            WindowAction::MoveWindow { .. } => ActionKind::MoveWindow,
            WindowAction::MoveWindowEnd { .. } => ActionKind::MoveWindowEnd,
            WindowAction::ResizeWindow { .. } => ActionKind::ResizeWindow,
            WindowAction::ResizeWindowEnd { .. } => ActionKind::ResizeWindowEnd,
            WindowAction::MaximizeWindow(_) => ActionKind::MaximizeWindow,
            WindowAction::MinimizeWindow(_) => ActionKind::MinimizeWindow,
            WindowAction::RestoreWindow(_) => ActionKind::RestoreWindow,
            WindowAction::ToggleFullscreen(_) => ActionKind::ToggleFullscreen,
            WindowAction::SetWindowColor { .. } => ActionKind::SetWindowColor,
            WindowAction::RenameWindow { .. } => ActionKind::RenameWindow,
            WindowAction::UpdateWindow { .. } => ActionKind::UpdateWindow,
            WindowAction::DuplicateWindow(_) => ActionKind::DuplicateWindow,
            WindowAction::AddTab { .. } => ActionKind::AddTab,
            WindowAction::CloseTab { .. } => ActionKind::CloseTab,
            WindowAction::SwitchTab { .. } => ActionKind::SwitchTab,
            WindowAction::UpdateTab { .. } => ActionKind::UpdateTab,
            WindowAction::SelectWindow(_) => ActionKind::SelectWindow,
            WindowAction::DeselectWindow(_) => ActionKind::DeselectWindow,
            WindowAction::ToggleWindowSelection(_) => ActionKind::ToggleWindowSelection,
            WindowAction::SelectWindowsInRect(_) => ActionKind::SelectWindowsInRect,
            WindowAction::ClearSelection => ActionKind::ClearSelection,
            WindowAction::SelectAllWindows => ActionKind::SelectAllWindows,
            WindowAction::DeleteSelectedWindows => ActionKind::DeleteSelectedWindows,
            WindowAction::CascadeWindows => ActionKind::CascadeWindows,
            WindowAction::TileWindows => ActionKind::TileWindows,
            WindowAction::GridArrangeWindows => ActionKind::GridArrangeWindows,
            WindowAction::SetZoom { .. } => ActionKind::SetZoom,
            WindowAction::SetPan(_) => ActionKind::SetPan,
            WindowAction::ResetZoom => ActionKind::ResetZoom,
            WindowAction::InitializeCanvasView(_) => ActionKind::InitializeCanvasView,
            WindowAction::ZoomToSelection(_) => ActionKind::ZoomToSelection,
            WindowAction::ToggleSelectionMode => ActionKind::ToggleSelectionMode,
            WindowAction::ToggleWindowCursorMode => ActionKind::ToggleWindowCursorMode,
            WindowAction::ToggleSoloMode => ActionKind::ToggleSoloMode,
            WindowAction::ToggleHideAllMode => ActionKind::ToggleHideAllMode,
            WindowAction::SetModes(_) => ActionKind::SetModes,
            WindowAction::RestoreState { .. } => ActionKind::RestoreState,
            WindowAction::RestoreFromSnapshot(_) => ActionKind::RestoreFromSnapshot,
        }
    }

    pub fn create_default() -> Self {
        WindowAction::CreateWindow {
            origin: None,
            size: None,
            url: None,
        }
    }
}

/// Compute the state that follows `action`. `state` is left untouched.
pub fn reduce(state: &WindowManagerState, action: &WindowAction) -> WindowManagerState {
    let mut next = state.clone();
    apply(&mut next, action);
    next
}

fn apply(state: &mut WindowManagerState, action: &WindowAction) {
    match action {
        WindowAction::CreateWindow { origin, size, url } => {
            state.spawn_window(*origin, *size, url.as_deref());
        },
        WindowAction::CloseWindow(id) => {
            if state.window(*id).is_none() {
                return;
            }
            let id = *id;
            state.remove_windows(|candidate| candidate == id);
        },
        WindowAction::FocusWindow(id) => {
            match state.window(*id) {
                Some(window) if !window.is_minimized => state.raise(*id),
                _ => {},
            }
        },
        WindowAction::MoveWindow { id, origin } | WindowAction::MoveWindowEnd { id, origin } => {
            if let Some(window) = state.window_mut(*id) {
                window.set_origin(*origin);
            }
        },
        WindowAction::ResizeWindow { id, rect } | WindowAction::ResizeWindowEnd { id, rect } => {
            if let Some(window) = state.window_mut(*id) {
                window.set_rect(geometry::normalize_rect(*rect));
            }
        },
        WindowAction::MaximizeWindow(id) => {
            if let Some(window) = state.window_mut(*id) {
                window.is_maximized = !window.is_maximized;
            }
        },
        WindowAction::MinimizeWindow(id) => {
            let Some(window) = state.window_mut(*id) else {
                return;
            };
            window.is_minimized = true;
            if state.active_window_id == Some(*id) {
                state.active_window_id = state.topmost(|w| !w.is_minimized);
            }
        },
        WindowAction::RestoreWindow(id) => {
            let Some(window) = state.window_mut(*id) else {
                return;
            };
            window.is_minimized = false;
            state.raise(*id);
        },
        WindowAction::ToggleFullscreen(id) => {
            if let Some(window) = state.window_mut(*id) {
                window.is_fullscreen = !window.is_fullscreen;
            }
        },
        WindowAction::SetWindowColor { id, color } => {
            if let Some(color) = color
                && !is_palette_color(color)
            {
                debug!("Ignoring window color {color:?} outside the palette");
                return;
            }
            if let Some(window) = state.window_mut(*id) {
                window.window_color.clone_from(color);
            }
        },
        WindowAction::RenameWindow { id, name } => {
            let name = name.trim();
            if name.is_empty() {
                return;
            }
            if let Some(window) = state.window_mut(*id) {
                window.name = name.to_string();
            }
        },
        WindowAction::UpdateWindow { id, patch } => {
            if let Some(window) = state.window_mut(*id) {
                patch.apply(window);
            }
        },
        WindowAction::DuplicateWindow(id) => {
            let Some(source) = state.window(*id) else {
                return;
            };
            let copy = source.duplicate(format!("{} (Copy)", source.name), state.max_z() + 1);
            state.active_window_id = Some(copy.id);
            state.windows.push(copy);
            state.next_window_id += 1;
        },
        WindowAction::AddTab { window, url } => {
            if let Some(window) = state.window_mut(*window) {
                window.tabs.push(Tab::new(url.as_deref().unwrap_or(DEFAULT_URL)));
                window.active_tab_index = window.tabs.len() - 1;
            }
        },
        WindowAction::CloseTab { window, index } => {
            let index = *index;
            let window_id = *window;
            let Some(window) = state.window_mut(window_id) else {
                return;
            };
            if index >= window.tabs.len() {
                return;
            }
            if window.tabs.len() == 1 {
                state.remove_windows(|candidate| candidate == window_id);
                return;
            }
            window.tabs.remove(index);
            let active = window.active_tab_index;
            window.active_tab_index = if index < active {
                active - 1
            } else if index == active {
                index.min(window.tabs.len() - 1)
            } else {
                active
            };
        },
        WindowAction::SwitchTab { window, index } => {
            if let Some(window) = state.window_mut(*window)
                && *index < window.tabs.len()
            {
                window.active_tab_index = *index;
            }
        },
        WindowAction::UpdateTab {
            window,
            index,
            patch,
        } => {
            if let Some(tab) = state
                .window_mut(*window)
                .and_then(|w| w.tabs.get_mut(*index))
            {
                patch.apply(tab);
            }
        },
        WindowAction::SelectWindow(id) => {
            if state.window(*id).is_some() {
                state.selection.select(*id);
            }
        },
        WindowAction::DeselectWindow(id) => state.selection.deselect(*id),
        WindowAction::ToggleWindowSelection(id) => {
            if state.window(*id).is_some() {
                state.selection.toggle(*id);
            }
        },
        WindowAction::SelectWindowsInRect(rect) => {
            let hits: Vec<WindowId> = state
                .windows
                .iter()
                .filter(|w| geometry::rects_intersect(&w.rect(), rect))
                .map(|w| w.id)
                .collect();
            state.selection.update_many(hits, SelectionUpdateMode::Replace);
        },
        WindowAction::ClearSelection => state.selection.clear(),
        WindowAction::SelectAllWindows => {
            let all: Vec<WindowId> = state.windows.iter().map(|w| w.id).collect();
            state.selection.update_many(all, SelectionUpdateMode::Replace);
        },
        WindowAction::DeleteSelectedWindows => {
            if state.selection.is_empty() {
                return;
            }
            let doomed = state.selection.clone();
            state.remove_windows(|candidate| doomed.contains(candidate));
            state.selection.clear();
        },
        WindowAction::CascadeWindows => {
            let targets = state.layout_targets();
            let rects = layout::cascade_rects(targets.len());
            state.arrange(&targets, rects);
        },
        WindowAction::TileWindows => {
            let targets = state.layout_targets();
            let rects = layout::tile_rects(targets.len());
            state.arrange(&targets, rects);
        },
        WindowAction::GridArrangeWindows => {
            let targets = state.layout_targets();
            let bounds = geometry::bounding_box(
                targets
                    .iter()
                    .filter_map(|id| state.window(*id))
                    .map(Window::rect),
            );
            let Some(bounds) = bounds else {
                return;
            };
            let rects = layout::grid_arrange_rects(targets.len(), bounds.min);
            state.arrange(&targets, rects);
        },
        WindowAction::SetZoom { zoom, pan } => {
            let clamped = geometry::clamp_zoom(*zoom);
            if clamped != *zoom && clamped == state.canvas.zoom {
                debug!("Ignoring zoom request {zoom} past the limit");
                return;
            }
            state.canvas.zoom = clamped;
            if let Some(pan) = pan {
                state.canvas.set_pan(*pan);
            }
        },
        WindowAction::SetPan(pan) => state.canvas.set_pan(*pan),
        WindowAction::ResetZoom => state.canvas = CanvasView::default(),
        WindowAction::InitializeCanvasView(viewport) => {
            state.canvas = geometry::initial_view(*viewport);
        },
        WindowAction::ZoomToSelection(viewport) => {
            let targets = state.layout_targets();
            let bounds = geometry::bounding_box(
                targets
                    .iter()
                    .filter_map(|id| state.window(*id))
                    .map(Window::rect),
            );
            if let Some(bounds) = bounds {
                state.canvas = geometry::fit_bounds(&bounds, *viewport, FIT_PADDING, FIT_MAX_ZOOM);
            }
        },
        WindowAction::ToggleSelectionMode => {
            let enabled = !state.modes.selection_mode;
            state.set_selection_mode(enabled);
        },
        WindowAction::ToggleWindowCursorMode => {
            state.modes.window_cursor_mode = !state.modes.window_cursor_mode;
        },
        WindowAction::ToggleSoloMode => state.modes.solo_mode = !state.modes.solo_mode,
        WindowAction::ToggleHideAllMode => state.modes.hide_all_mode = !state.modes.hide_all_mode,
        WindowAction::SetModes(patch) => {
            if let Some(enabled) = patch.selection_mode {
                state.set_selection_mode(enabled);
            }
            if let Some(enabled) = patch.window_cursor_mode {
                state.modes.window_cursor_mode = enabled;
            }
            if let Some(enabled) = patch.solo_mode {
                state.modes.solo_mode = enabled;
            }
            if let Some(enabled) = patch.hide_all_mode {
                state.modes.hide_all_mode = enabled;
            }
        },
        WindowAction::RestoreState {
            windows,
            canvas,
            next_window_id,
        } => {
            state.load_windows(windows);
            state.canvas = *canvas;
            state.canvas.zoom = geometry::clamp_zoom(canvas.zoom);
            state.next_window_id = *next_window_id;
            state.selection.clear();
            state.active_window_id = state.topmost(|_| true);
        },
        WindowAction::RestoreFromSnapshot(snapshot) => {
            state.load_windows(&snapshot.windows);
            state.canvas = snapshot.canvas;
            state.canvas.zoom = geometry::clamp_zoom(snapshot.canvas.zoom);
            state.next_window_id = snapshot.next_window_id;
            state.selection.update_many(
                snapshot.selected_window_ids.iter().copied(),
                SelectionUpdateMode::Replace,
            );
            state.selection.retain_existing(&state.windows);
            state.active_window_id = snapshot
                .active_window_id
                .filter(|id| state.window(*id).is_some())
                .or_else(|| state.topmost(|_| true));
        },
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub kind: ActionKind,
    /// False when the action left the state equal to what it was.
    pub changed: bool,
}

/// Owner of the live window manager state.
#[derive(Debug, Clone, Default)]
pub struct WindowManager {
    state: WindowManagerState,
}

impl WindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: WindowManagerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &WindowManagerState {
        &self.state
    }

    pub fn dispatch(&mut self, action: WindowAction) -> DispatchOutcome {
        let kind = action.kind();
        let next = reduce(&self.state, &action);
        let changed = next != self.state;
        if changed {
            self.state = next;
        } else {
            debug!("{kind:?} left the window manager state unchanged");
        }
        DispatchOutcome { kind, changed }
    }
}
