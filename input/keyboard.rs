/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Global keyboard shortcuts.
//!
//! [`KeyboardRouter::route`] maps one key press to at most one
//! [`KeyCommand`]. Most shortcuts use the platform command modifier (Cmd on
//! macOS, Ctrl elsewhere). Unmodified single-key shortcuts stay quiet while
//! a text field has focus.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use keyboard_types::{Key, Modifiers, NamedKey};
use log::debug;

use crate::content::{NavigationCommand, NavigationController};
use crate::geometry::{MAX_ZOOM, MIN_ZOOM, RESET_ZOOM};
use crate::manager::{WindowAction, WindowManagerState};
use crate::model::Window;
use crate::prefs::CanvasPreferences;

const ZOOM_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    pub fn command_modifier(self) -> Modifiers {
        match self {
            Platform::Mac => Modifiers::META,
            Platform::Other => Modifiers::CONTROL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// A text field (URL bar, rename box) currently has keyboard focus.
    pub in_text_input: bool,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            in_text_input: false,
        }
    }

    pub fn character(c: &str, modifiers: Modifiers) -> Self {
        Self::new(Key::Character(c.to_string()), modifiers)
    }
}

/// What a shortcut asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    Window(WindowAction),
    Navigate(NavigationCommand),
    Undo,
    Redo,
    /// Needs the viewport size, which only the host knows.
    ZoomToSelection,
    FocusUrlBar,
    ToggleHelp,
    ToggleSettings,
    ToggleProjectDashboard,
}

impl From<WindowAction> for KeyCommand {
    fn from(action: WindowAction) -> Self {
        KeyCommand::Window(action)
    }
}

/// Shifted punctuation is reported as its shifted glyph; fold it back onto
/// the unshifted key so `Shift+[` reads as `[`.
fn base_key(c: &str) -> String {
    match c {
        "{" => "[".to_string(),
        "}" => "]".to_string(),
        "+" => "=".to_string(),
        "_" => "-".to_string(),
        "<" => ",".to_string(),
        "?" => "/".to_string(),
        _ => c.to_lowercase(),
    }
}

pub struct KeyboardRouter {
    platform: Platform,
    escape_presses: VecDeque<Instant>,
    panic_presses: usize,
    panic_window: Duration,
}

impl KeyboardRouter {
    pub fn new(platform: Platform) -> Self {
        Self::from_prefs(platform, &CanvasPreferences::default())
    }

    pub fn from_prefs(platform: Platform, prefs: &CanvasPreferences) -> Self {
        Self {
            platform,
            escape_presses: VecDeque::new(),
            panic_presses: prefs.escape_panic_presses,
            panic_window: prefs.escape_panic_window(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn route(
        &mut self,
        input: &KeyInput,
        state: &WindowManagerState,
        now: Instant,
    ) -> Option<KeyCommand> {
        let command = input.modifiers.contains(self.platform.command_modifier());
        let shift = input.modifiers.contains(Modifiers::SHIFT);
        let alt = input.modifiers.contains(Modifiers::ALT);
        let active = state.active_window();

        match &input.key {
            Key::Named(NamedKey::Escape) => self.escape(state, now),
            Key::Named(NamedKey::F11) => {
                active.map(|w| WindowAction::ToggleFullscreen(w.id).into())
            },
            Key::Named(NamedKey::Enter) if command => {
                active.map(|w| WindowAction::ToggleFullscreen(w.id).into())
            },
            Key::Named(NamedKey::Tab) if !command && !alt && !input.in_text_input => {
                cycle_focus(state, !shift)
            },
            Key::Named(NamedKey::Delete | NamedKey::Backspace)
                if !command && !input.in_text_input && !state.selection.is_empty() =>
            {
                Some(WindowAction::DeleteSelectedWindows.into())
            },
            Key::Character(c) if command => {
                self.command_shortcut(&base_key(c), shift, input.in_text_input, state, active)
            },
            Key::Character(c) if !shift && !alt && !input.in_text_input => {
                plain_shortcut(&base_key(c), state, active)
            },
            _ => None,
        }
    }

    fn command_shortcut(
        &self,
        key: &str,
        shift: bool,
        in_text_input: bool,
        state: &WindowManagerState,
        active: Option<&Window>,
    ) -> Option<KeyCommand> {
        let zoom = state.canvas.zoom;
        match (key, shift) {
            ("n", false) => Some(WindowAction::create_default().into()),
            ("n", true) => Some(KeyCommand::ToggleProjectDashboard),
            ("t", false) => active.map(|w| {
                WindowAction::AddTab {
                    window: w.id,
                    url: None,
                }
                .into()
            }),
            ("t", true) => Some(WindowAction::TileWindows.into()),
            ("w", false) => active.map(|w| {
                if w.tabs.len() > 1 {
                    WindowAction::CloseTab {
                        window: w.id,
                        index: w.active_tab_index,
                    }
                    .into()
                } else {
                    WindowAction::CloseWindow(w.id).into()
                }
            }),
            ("w", true) => active.map(|w| WindowAction::CloseWindow(w.id).into()),
            ("l", _) => Some(KeyCommand::FocusUrlBar),
            ("r", _) => {
                let w = active?;
                NavigationController::reload(state, w.id, w.active_tab_index).map(KeyCommand::Navigate)
            },
            ("[", false) => {
                let w = active?;
                NavigationController::go_back(state, w.id, w.active_tab_index).map(KeyCommand::Navigate)
            },
            ("]", false) => {
                let w = active?;
                NavigationController::go_forward(state, w.id, w.active_tab_index)
                    .map(KeyCommand::Navigate)
            },
            ("[", true) => step_tab(active?, false),
            ("]", true) => step_tab(active?, true),
            ("1", false) => Some(WindowAction::ToggleWindowCursorMode.into()),
            ("2", false) => Some(WindowAction::ToggleHideAllMode.into()),
            ("3" | "4" | "5" | "6" | "7" | "8" | "9", _) => {
                let w = active?;
                let index = key.parse::<usize>().ok()? - 1;
                (index < w.tabs.len()).then(|| {
                    WindowAction::SwitchTab {
                        window: w.id,
                        index,
                    }
                    .into()
                })
            },
            (",", _) => Some(KeyCommand::ToggleSettings),
            ("/", _) => Some(KeyCommand::ToggleHelp),
            ("m", false) => active.map(|w| WindowAction::MinimizeWindow(w.id).into()),
            ("m", true) => active.map(|w| WindowAction::MaximizeWindow(w.id).into()),
            ("c", true) => Some(WindowAction::CascadeWindows.into()),
            ("z", false) => Some(KeyCommand::Undo),
            ("z", true) | ("y", _) => Some(KeyCommand::Redo),
            ("0", _) => Some(
                WindowAction::SetZoom {
                    zoom: RESET_ZOOM,
                    pan: None,
                }
                .into(),
            ),
            ("=", _) => Some(
                WindowAction::SetZoom {
                    zoom: (zoom + ZOOM_STEP).min(MAX_ZOOM),
                    pan: None,
                }
                .into(),
            ),
            ("-", _) => Some(
                WindowAction::SetZoom {
                    zoom: (zoom - ZOOM_STEP).max(MIN_ZOOM),
                    pan: None,
                }
                .into(),
            ),
            ("g", false) => Some(WindowAction::GridArrangeWindows.into()),
            ("a", _) if !in_text_input => Some(WindowAction::SelectAllWindows.into()),
            ("h", true) => Some(WindowAction::ToggleHideAllMode.into()),
            ("s", true) => Some(WindowAction::ToggleSoloMode.into()),
            _ => None,
        }
    }

    /// Escape clears the selection, else leaves fullscreen. Enough presses
    /// in quick succession toggle hide-all instead.
    fn escape(&mut self, state: &WindowManagerState, now: Instant) -> Option<KeyCommand> {
        self.escape_presses.push_back(now);
        while let Some(oldest) = self.escape_presses.front() {
            if now.saturating_duration_since(*oldest) < self.panic_window {
                break;
            }
            self.escape_presses.pop_front();
        }
        if self.escape_presses.len() >= self.panic_presses {
            debug!("Escape pressed {} times, toggling hide-all", self.escape_presses.len());
            self.escape_presses.clear();
            return Some(WindowAction::ToggleHideAllMode.into());
        }

        if !state.selection.is_empty() {
            return Some(WindowAction::ClearSelection.into());
        }
        state
            .active_window()
            .filter(|w| w.is_fullscreen)
            .map(|w| WindowAction::ToggleFullscreen(w.id).into())
    }
}

fn plain_shortcut(
    key: &str,
    state: &WindowManagerState,
    active: Option<&Window>,
) -> Option<KeyCommand> {
    match key {
        "s" => Some(WindowAction::ToggleSelectionMode.into()),
        "v" => active.map(|w| {
            if state.selection.contains(w.id) {
                WindowAction::DeselectWindow(w.id).into()
            } else {
                WindowAction::SelectWindow(w.id).into()
            }
        }),
        "z" => Some(KeyCommand::ZoomToSelection),
        _ => None,
    }
}

/// Focus the next (or previous) non-minimized window in list order.
fn cycle_focus(state: &WindowManagerState, forward: bool) -> Option<KeyCommand> {
    let visible: Vec<&Window> = state.windows.iter().filter(|w| !w.is_minimized).collect();
    if visible.len() < 2 {
        return None;
    }
    let current = visible
        .iter()
        .position(|w| Some(w.id) == state.active_window_id);
    let count = visible.len();
    let target = match (current, forward) {
        (Some(i), true) => (i + 1) % count,
        (None, true) => 0,
        (Some(i), false) if i > 0 => i - 1,
        (_, false) => count - 1,
    };
    Some(WindowAction::FocusWindow(visible[target].id).into())
}

fn step_tab(window: &Window, forward: bool) -> Option<KeyCommand> {
    let count = window.tabs.len();
    if count < 2 {
        return None;
    }
    let current = window.active_tab_index;
    let index = if forward {
        (current + 1) % count
    } else if current > 0 {
        current - 1
    } else {
        count - 1
    };
    Some(
        WindowAction::SwitchTab {
            window: window.id,
            index,
        }
        .into(),
    )
}
