/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Coordinate math for the canvas and its viewport.
//!
//! Canvas coordinates are the stable positions windows are stored in.
//! Viewport coordinates are pixels relative to the on-screen canvas area.
//! The two are related by `viewport = canvas * zoom + pan`. Both spaces are
//! distinct euclid units so a point from one cannot be handed to code that
//! expects the other.

use euclid::{Box2D, Point2D, Rect, Size2D, Vector2D};
use serde::{Deserialize, Serialize};

/// Unit marker for canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpace;

/// Unit marker for viewport (screen pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSpace;

/// Unit marker for the minimap overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimapSpace;

pub type CanvasPoint = Point2D<f64, CanvasSpace>;
pub type CanvasSize = Size2D<f64, CanvasSpace>;
pub type CanvasRect = Rect<f64, CanvasSpace>;
pub type CanvasBox = Box2D<f64, CanvasSpace>;
pub type CanvasVector = Vector2D<f64, CanvasSpace>;

pub type ViewportPoint = Point2D<f64, ViewportSpace>;
pub type ViewportSize = Size2D<f64, ViewportSpace>;
pub type ViewportRect = Rect<f64, ViewportSpace>;
pub type ViewportVector = Vector2D<f64, ViewportSpace>;

pub type MinimapPoint = Point2D<f64, MinimapSpace>;
pub type MinimapRect = Rect<f64, MinimapSpace>;

/// Edge length of the square canvas.
pub const CANVAS_SIZE: f64 = 50_000.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 2.0;
/// Zoom used when a canvas view is first initialised.
pub const INITIAL_ZOOM: f64 = 0.5;
/// Zoom restored by "reset zoom".
pub const RESET_ZOOM: f64 = 1.0;

/// Zoom and pan of the canvas. Pan is expressed in viewport pixels.
///
/// Serialized as `{ zoom, panX, panY }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl CanvasView {
    pub fn new(zoom: f64, pan: ViewportVector) -> Self {
        Self {
            zoom,
            pan_x: pan.x,
            pan_y: pan.y,
        }
    }

    pub fn pan(&self) -> ViewportVector {
        Vector2D::new(self.pan_x, self.pan_y)
    }

    pub fn set_pan(&mut self, pan: ViewportVector) {
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }

    pub fn is_finite(&self) -> bool {
        self.zoom.is_finite() && self.pan_x.is_finite() && self.pan_y.is_finite()
    }
}

impl Default for CanvasView {
    /// Zoom 1 with no pan.
    fn default() -> Self {
        Self {
            zoom: RESET_ZOOM,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return RESET_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn canvas_center() -> CanvasPoint {
    Point2D::new(CANVAS_SIZE / 2.0, CANVAS_SIZE / 2.0)
}

/// Convert a viewport point into canvas coordinates.
pub fn to_canvas_point(point: ViewportPoint, view: &CanvasView) -> CanvasPoint {
    ((point - view.pan()) / view.zoom).cast_unit()
}

/// Convert a canvas point into viewport coordinates.
pub fn to_viewport_point(point: CanvasPoint, view: &CanvasView) -> ViewportPoint {
    (point * view.zoom).cast_unit() + view.pan()
}

/// Normalise a rectangle that may carry a negative width or height, as a
/// drag rectangle does when the pointer moves up or left of its anchor.
pub fn normalize_rect<U>(rect: Rect<f64, U>) -> Rect<f64, U> {
    let x0 = rect.origin.x;
    let x1 = rect.origin.x + rect.size.width;
    let y0 = rect.origin.y;
    let y1 = rect.origin.y + rect.size.height;
    Rect::new(
        Point2D::new(x0.min(x1), y0.min(y1)),
        Size2D::new((x1 - x0).abs(), (y1 - y0).abs()),
    )
}

/// Convert a viewport rectangle into canvas coordinates.
pub fn to_canvas_rect(rect: ViewportRect, view: &CanvasView) -> CanvasRect {
    let rect = normalize_rect(rect);
    Rect::new(
        to_canvas_point(rect.origin, view),
        (rect.size / view.zoom).cast_unit(),
    )
}

/// Convert a canvas rectangle into viewport coordinates.
pub fn to_viewport_rect(rect: CanvasRect, view: &CanvasView) -> ViewportRect {
    let rect = normalize_rect(rect);
    Rect::new(
        to_viewport_point(rect.origin, view),
        (rect.size * view.zoom).cast_unit(),
    )
}

/// Pan that keeps the canvas point under `anchor` fixed while the zoom
/// changes from `view.zoom` to `new_zoom`.
pub fn zoom_at_point(view: &CanvasView, anchor: ViewportPoint, new_zoom: f64) -> ViewportVector {
    let fixed = to_canvas_point(anchor, view);
    anchor.to_vector() - (fixed.to_vector() * new_zoom).cast_unit()
}

fn clamp_pan_axis(pan: f64, viewport_extent: f64, scaled_canvas: f64) -> f64 {
    let min = viewport_extent - scaled_canvas;
    if min >= 0.0 {
        // Canvas smaller than the viewport on this axis: pin it.
        return 0.0;
    }
    pan.clamp(min, 0.0)
}

/// Hard-stop the pan so no canvas edge is dragged past the matching
/// viewport edge.
pub fn clamp_pan(
    pan: ViewportVector,
    zoom: f64,
    viewport: ViewportSize,
    canvas_size: f64,
) -> ViewportVector {
    let scaled = canvas_size * zoom;
    Vector2D::new(
        clamp_pan_axis(pan.x, viewport.width, scaled),
        clamp_pan_axis(pan.y, viewport.height, scaled),
    )
}

/// Open-interval overlap test. Rectangles that only share an edge do not
/// intersect.
pub fn rects_intersect(a: &CanvasRect, b: &CanvasRect) -> bool {
    let a = normalize_rect(*a);
    let b = normalize_rect(*b);
    a.min_x() < b.max_x() && b.min_x() < a.max_x() && a.min_y() < b.max_y() && b.min_y() < a.max_y()
}

/// Smallest box containing every rectangle, or `None` for an empty input.
pub fn bounding_box<I>(rects: I) -> Option<CanvasBox>
where
    I: IntoIterator<Item = CanvasRect>,
{
    rects.into_iter().map(normalize_rect).fold(None, |acc, rect| {
        let next = Box2D::new(rect.min(), rect.max());
        Some(match acc {
            None => next,
            Some(acc) => Box2D::new(
                Point2D::new(acc.min.x.min(next.min.x), acc.min.y.min(next.min.y)),
                Point2D::new(acc.max.x.max(next.max.x), acc.max.y.max(next.max.y)),
            ),
        })
    })
}

/// The view a freshly opened canvas starts with: initial zoom, with the
/// canvas centre in the middle of the viewport.
pub fn initial_view(viewport: ViewportSize) -> CanvasView {
    let center = canvas_center();
    let pan = Vector2D::new(
        viewport.width / 2.0 - center.x * INITIAL_ZOOM,
        viewport.height / 2.0 - center.y * INITIAL_ZOOM,
    );
    CanvasView::new(INITIAL_ZOOM, pan)
}

/// Padding kept around a box when zooming to fit it.
pub const FIT_PADDING: f64 = 80.0;
/// Zoom-to-fit never magnifies past this.
pub const FIT_MAX_ZOOM: f64 = 1.0;

/// View that fits `bounds` inside the viewport with `padding` on each side.
pub fn fit_bounds(
    bounds: &CanvasBox,
    viewport: ViewportSize,
    padding: f64,
    max_zoom: f64,
) -> CanvasView {
    let avail_w = (viewport.width - padding * 2.0).max(1.0);
    let avail_h = (viewport.height - padding * 2.0).max(1.0);
    let width = bounds.width();
    let height = bounds.height();

    let mut zoom = max_zoom;
    if width > 0.0 {
        zoom = zoom.min(avail_w / width);
    }
    if height > 0.0 {
        zoom = zoom.min(avail_h / height);
    }
    let zoom = clamp_zoom(zoom);

    let center = bounds.center();
    let pan = Vector2D::new(
        viewport.width / 2.0 - center.x * zoom,
        viewport.height / 2.0 - center.y * zoom,
    );
    CanvasView::new(zoom, pan)
}

/// On-screen rectangle of a window. Maximised windows cover the viewport
/// regardless of their stored rectangle.
pub fn effective_viewport_rect(
    rect: CanvasRect,
    maximized: bool,
    view: &CanvasView,
    viewport: ViewportSize,
) -> ViewportRect {
    if maximized {
        return Rect::new(Point2D::origin(), viewport);
    }
    to_viewport_rect(rect, view)
}

/// Scales the whole canvas into a small square overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    pub size: f64,
    pub padding: f64,
    pub canvas_size: f64,
}

impl Default for MinimapProjection {
    fn default() -> Self {
        Self {
            size: 150.0,
            padding: 4.0,
            canvas_size: CANVAS_SIZE,
        }
    }
}

impl MinimapProjection {
    const MIN_WINDOW_EXTENT: f64 = 2.0;
    const MIN_INDICATOR_EXTENT: f64 = 4.0;

    pub fn scale(&self) -> f64 {
        (self.size - self.padding * 2.0) / self.canvas_size
    }

    pub fn to_minimap(&self, point: CanvasPoint) -> MinimapPoint {
        let scale = self.scale();
        Point2D::new(
            point.x * scale + self.padding,
            point.y * scale + self.padding,
        )
    }

    pub fn to_canvas(&self, point: MinimapPoint) -> CanvasPoint {
        let scale = self.scale();
        Point2D::new(
            (point.x - self.padding) / scale,
            (point.y - self.padding) / scale,
        )
    }

    /// Minimap footprint of a window; tiny windows stay visible.
    pub fn window_rect(&self, rect: CanvasRect) -> MinimapRect {
        let scale = self.scale();
        Rect::new(
            self.to_minimap(rect.origin),
            Size2D::new(
                (rect.size.width * scale).max(Self::MIN_WINDOW_EXTENT),
                (rect.size.height * scale).max(Self::MIN_WINDOW_EXTENT),
            ),
        )
    }

    /// The part of the canvas currently visible in the viewport.
    pub fn viewport_indicator(&self, view: &CanvasView, viewport: ViewportSize) -> MinimapRect {
        let visible = to_canvas_rect(Rect::new(Point2D::origin(), viewport), view);
        let scale = self.scale();
        Rect::new(
            self.to_minimap(visible.origin),
            Size2D::new(
                (visible.size.width * scale).max(Self::MIN_INDICATOR_EXTENT),
                (visible.size.height * scale).max(Self::MIN_INDICATOR_EXTENT),
            ),
        )
    }

    /// Pan that centres the clicked canvas point in the viewport at `zoom`.
    pub fn click_to_pan(
        &self,
        click: MinimapPoint,
        zoom: f64,
        viewport: ViewportSize,
    ) -> ViewportVector {
        let target = self.to_canvas(click);
        Vector2D::new(
            viewport.width / 2.0 - target.x * zoom,
            viewport.height / 2.0 - target.y * zoom,
        )
    }
}
