/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Window/canvas manager for a spatial browser.
//!
//! Many browser windows, each with its own tabs, live on one large pannable
//! and zoomable canvas. This crate owns their geometry, z-order, selection,
//! the viewport transform, layout algorithms, a bounded undo/redo history and
//! project persistence. Web content itself is an external collaborator that
//! reports events through [`content`].

pub mod app;
pub mod content;
pub mod geometry;
pub mod history;
pub mod input;
pub mod manager;
pub mod model;
pub mod persistence;
pub mod prefs;
pub mod projects;

pub use app::CanvasApp;
pub use manager::{WindowAction, WindowManager, WindowManagerState};
pub use model::{ProjectId, Tab, TabId, Window, WindowId};

/// Crate version, as recorded in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
