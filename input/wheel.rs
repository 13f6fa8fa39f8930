/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wheel and trackpad input over the empty canvas.
//!
//! - Ctrl/Cmd with pixel deltas: trackpad pinch, zoom at the pointer.
//! - Pixel deltas without a modifier: two-finger scroll, pan.
//! - Line or page deltas: mouse wheel, zoom at the pointer.

use keyboard_types::Modifiers;
use log::trace;

use super::has_ctrl_or_meta;
use crate::geometry::{
    self, CANVAS_SIZE, CanvasView, ViewportPoint, ViewportSize, ViewportVector,
};
use crate::manager::WindowAction;
use crate::prefs::CanvasPreferences;

/// Unit of a wheel delta, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    Pixel,
    Line,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta: ViewportVector,
    pub delta_mode: DeltaMode,
    pub modifiers: Modifiers,
    /// Pointer position relative to the canvas viewport.
    pub pointer: ViewportPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelController {
    pub pinch_sensitivity: f64,
    pub wheel_sensitivity: f64,
    pub forwarded_zoom_speed: f64,
}

impl Default for WheelController {
    fn default() -> Self {
        Self::from_prefs(&CanvasPreferences::default())
    }
}

impl WheelController {
    pub fn from_prefs(prefs: &CanvasPreferences) -> Self {
        Self {
            pinch_sensitivity: prefs.pinch_zoom_sensitivity,
            wheel_sensitivity: prefs.wheel_zoom_sensitivity,
            forwarded_zoom_speed: prefs.forwarded_zoom_speed,
        }
    }

    /// Action for one wheel event, or `None` when the view would not change.
    pub fn handle(
        &self,
        input: &WheelInput,
        view: &CanvasView,
        viewport: ViewportSize,
    ) -> Option<WindowAction> {
        match input.delta_mode {
            DeltaMode::Pixel if has_ctrl_or_meta(input.modifiers) => {
                let factor = 1.0 - input.delta.y * self.pinch_sensitivity;
                zoom_at(view, input.pointer, view.zoom * factor, viewport)
            },
            DeltaMode::Pixel => {
                let pan = geometry::clamp_pan(
                    view.pan() - input.delta,
                    view.zoom,
                    viewport,
                    CANVAS_SIZE,
                );
                (pan != view.pan()).then_some(WindowAction::SetPan(pan))
            },
            DeltaMode::Line | DeltaMode::Page => {
                let factor = 1.0 - input.delta.y * self.wheel_sensitivity;
                zoom_at(view, input.pointer, view.zoom * factor, viewport)
            },
        }
    }

    /// Zoom requested by page content that swallowed a ctrl+wheel event.
    /// The step is additive rather than multiplicative.
    pub fn forwarded_zoom(
        &self,
        delta_y: f64,
        pointer: ViewportPoint,
        view: &CanvasView,
        viewport: ViewportSize,
    ) -> Option<WindowAction> {
        zoom_at(view, pointer, view.zoom - delta_y * self.forwarded_zoom_speed, viewport)
    }
}

fn zoom_at(
    view: &CanvasView,
    anchor: ViewportPoint,
    requested: f64,
    viewport: ViewportSize,
) -> Option<WindowAction> {
    let zoom = geometry::clamp_zoom(requested);
    if zoom == view.zoom {
        trace!("Zoom pinned at {zoom}");
        return None;
    }
    let pan = geometry::zoom_at_point(view, anchor, zoom);
    let pan = geometry::clamp_pan(pan, zoom, viewport, CANVAS_SIZE);
    Some(WindowAction::SetZoom {
        zoom,
        pan: Some(pan),
    })
}
