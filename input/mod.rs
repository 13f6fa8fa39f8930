/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Input handling for the canvas.
//!
//! Each controller turns raw input into [`WindowAction`]s (or, for the
//! keyboard, [`keyboard::KeyCommand`]s) without touching state itself, so the
//! mapping can be tested without a window system.
//!
//! [`WindowAction`]: crate::manager::WindowAction

pub mod gesture;
pub mod keyboard;
pub mod wheel;

use keyboard_types::Modifiers;

pub use gesture::{GestureController, PointerButton, PointerPress, PointerTarget, ResizeHandle};
pub use keyboard::{KeyCommand, KeyInput, KeyboardRouter, Platform};
pub use wheel::{DeltaMode, WheelController, WheelInput};

/// Ctrl on every platform, plus Cmd on macOS keyboards.
pub(crate) fn has_ctrl_or_meta(modifiers: Modifiers) -> bool {
    modifiers.intersects(Modifiers::CONTROL | Modifiers::META)
}
