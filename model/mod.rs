/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Window and tab records.
//!
//! These are plain data. The window manager is the only code that mutates
//! them in place, and it does so on clones of the state it was handed.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use euclid::{Point2D, Rect, Size2D};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{CANVAS_SIZE, CanvasPoint, CanvasRect, CanvasSize};

pub const DEFAULT_WINDOW_WIDTH: f64 = 1400.0;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 900.0;
pub const MIN_WINDOW_WIDTH: f64 = 400.0;
pub const MIN_WINDOW_HEIGHT: f64 = 300.0;
/// Offset applied per existing window when placing a new one.
pub const NEW_WINDOW_STAGGER: f64 = 40.0;
pub const DUPLICATE_OFFSET: f64 = 40.0;
pub const DEFAULT_URL: &str = "https://www.google.com";
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Selectable window tints. `None` clears the tint.
pub const WINDOW_COLORS: &[(&str, Option<&str>)] = &[
    ("None", None),
    ("Sky Blue", Some("#87CEEB")),
    ("Lavender", Some("#E6E6FA")),
    ("Mint", Some("#98FF98")),
    ("Cream", Some("#FFFDD0")),
    ("Rose", Some("#FFE4E1")),
    ("Aqua", Some("#7FFFD4")),
];

/// Whether `color` is one of the [`WINDOW_COLORS`] tints. Hex digits
/// compare case-insensitively.
pub fn is_palette_color(color: &str) -> bool {
    WINDOW_COLORS
        .iter()
        .filter_map(|(_, value)| *value)
        .any(|value| value.eq_ignore_ascii_case(color))
}

pub fn default_window_size() -> CanvasSize {
    Size2D::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT)
}

/// Top-left of the first window: the default-sized window centred on the
/// canvas.
pub fn default_window_position() -> CanvasPoint {
    Point2D::new(
        CANVAS_SIZE / 2.0 - DEFAULT_WINDOW_WIDTH / 2.0,
        CANVAS_SIZE / 2.0 - DEFAULT_WINDOW_HEIGHT / 2.0,
    )
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Clamp a size to the minimum window dimensions.
pub fn clamp_window_size(size: CanvasSize) -> CanvasSize {
    Size2D::new(
        if size.width.is_nan() { MIN_WINDOW_WIDTH } else { size.width.max(MIN_WINDOW_WIDTH) },
        if size.height.is_nan() { MIN_WINDOW_HEIGHT } else { size.height.max(MIN_WINDOW_HEIGHT) },
    )
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Stable identity of a browser window on the canvas.
    WindowId
);
uuid_id!(
    /// Stable identity of a tab.
    TabId
);
uuid_id!(
    /// Stable identity of a saved project.
    ProjectId
);

/// Opaque record of one tab's web content, as last reported by the content
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub favicon: String,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub can_go_back: bool,
    #[serde(default)]
    pub can_go_forward: bool,
}

impl Tab {
    /// A fresh tab that is about to load `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: TabId::new(),
            url: url.into(),
            title: NEW_TAB_TITLE.to_string(),
            favicon: String::new(),
            is_loading: true,
            can_go_back: false,
            can_go_forward: false,
        }
    }

    /// Same content under a new id. Navigation history does not carry over.
    pub fn duplicate(&self) -> Self {
        Self {
            id: TabId::new(),
            url: self.url.clone(),
            title: self.title.clone(),
            favicon: self.favicon.clone(),
            is_loading: true,
            can_go_back: false,
            can_go_forward: false,
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Partial update of a tab. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub favicon: Option<String>,
    pub is_loading: Option<bool>,
    pub can_go_back: Option<bool>,
    pub can_go_forward: Option<bool>,
}

impl TabPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn loading(is_loading: bool) -> Self {
        Self {
            is_loading: Some(is_loading),
            ..Self::default()
        }
    }

    /// Apply to `tab`, returning whether any field changed.
    pub fn apply(&self, tab: &mut Tab) -> bool {
        let before = tab.clone();
        if let Some(url) = &self.url {
            tab.url.clone_from(url);
        }
        if let Some(title) = &self.title {
            tab.title.clone_from(title);
        }
        if let Some(favicon) = &self.favicon {
            tab.favicon.clone_from(favicon);
        }
        if let Some(is_loading) = self.is_loading {
            tab.is_loading = is_loading;
        }
        if let Some(can_go_back) = self.can_go_back {
            tab.can_go_back = can_go_back;
        }
        if let Some(can_go_forward) = self.can_go_forward {
            tab.can_go_forward = can_go_forward;
        }
        *tab != before
    }
}

/// Partial update of a window's sidebar flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPatch {
    /// Hidden windows stay in the list and keep their geometry.
    pub is_hidden: Option<bool>,
    pub sync_enabled: Option<bool>,
}

impl WindowPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply to `window`, returning whether any field changed.
    pub fn apply(&self, window: &mut Window) -> bool {
        let mut changed = false;
        if let Some(is_hidden) = self.is_hidden {
            changed |= window.is_hidden != is_hidden;
            window.is_hidden = is_hidden;
        }
        if let Some(sync_enabled) = self.sync_enabled {
            changed |= window.sync_enabled != sync_enabled;
            window.sync_enabled = sync_enabled;
        }
        changed
    }
}

/// A browser window placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: WindowId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: u64,
    #[serde(default)]
    pub is_maximized: bool,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_fullscreen: bool,
    #[serde(default)]
    pub window_color: Option<String>,
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub active_tab_index: usize,
    #[serde(default)]
    pub sync_enabled: bool,
}

impl Window {
    /// New window with a single tab. The size is clamped to the minimum.
    pub fn new(name: impl Into<String>, rect: CanvasRect, z_index: u64, tab: Tab) -> Self {
        let size = clamp_window_size(rect.size);
        Self {
            id: WindowId::new(),
            name: name.into(),
            x: rect.origin.x,
            y: rect.origin.y,
            width: size.width,
            height: size.height,
            z_index,
            is_maximized: false,
            is_minimized: false,
            is_hidden: false,
            is_fullscreen: false,
            window_color: None,
            tabs: vec![tab],
            active_tab_index: 0,
            sync_enabled: false,
        }
    }

    pub fn origin(&self) -> CanvasPoint {
        Point2D::new(self.x, self.y)
    }

    pub fn size(&self) -> CanvasSize {
        Size2D::new(self.width, self.height)
    }

    /// Stored canvas rectangle. Maximising does not change it.
    pub fn rect(&self) -> CanvasRect {
        Rect::new(self.origin(), self.size())
    }

    pub fn set_origin(&mut self, origin: CanvasPoint) {
        self.x = origin.x;
        self.y = origin.y;
    }

    /// Set position and size, clamping the size to the minimum.
    pub fn set_rect(&mut self, rect: CanvasRect) {
        let size = clamp_window_size(rect.size);
        self.set_origin(rect.origin);
        self.width = size.width;
        self.height = size.height;
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active_tab_index)
    }

    pub fn tab_index(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == tab_id)
    }

    /// Copy with fresh window and tab ids, used by duplicate.
    pub fn duplicate(&self, name: String, z_index: u64) -> Self {
        let mut copy = self.clone();
        copy.id = WindowId::new();
        copy.name = name;
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = z_index;
        copy.tabs = self.tabs.iter().map(Tab::duplicate).collect();
        copy
    }

    /// Structural checks applied to windows loaded from storage.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && !self.tabs.is_empty()
            && self.active_tab_index < self.tabs.len()
    }
}
