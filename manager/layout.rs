/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Cascade, tile and grid arrangement.
//!
//! Each algorithm takes the number of target windows and returns one canvas
//! rectangle per target, in target order. Every arranged window gets the
//! default window size.

use euclid::{Point2D, Rect};

use crate::geometry::{CANVAS_SIZE, CanvasPoint, CanvasRect};
use crate::model::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, default_window_position, default_window_size};

/// Diagonal step between cascaded windows.
pub const CASCADE_STEP: f64 = 70.0;
/// Gap between tiled or grid-arranged windows.
pub const TILE_GAP: f64 = 20.0;

/// Grid dimensions for `count` cells: as square as possible, filled row by
/// row.
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let mut cols = (count as f64).sqrt().ceil() as usize;
    // Guard against float rounding on perfect squares.
    while cols * cols < count {
        cols += 1;
    }
    while cols > 1 && (cols - 1) * (cols - 1) >= count {
        cols -= 1;
    }
    let rows = count.div_ceil(cols);
    (cols, rows)
}

pub fn cascade_rects(count: usize) -> Vec<CanvasRect> {
    let start = default_window_position();
    (0..count)
        .map(|i| {
            let offset = i as f64 * CASCADE_STEP;
            Rect::new(
                Point2D::new(start.x + offset, start.y + offset),
                default_window_size(),
            )
        })
        .collect()
}

fn grid_rects(count: usize, anchor: CanvasPoint) -> Vec<CanvasRect> {
    let (cols, _) = grid_dimensions(count);
    (0..count)
        .map(|i| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            Rect::new(
                Point2D::new(
                    anchor.x + col * (DEFAULT_WINDOW_WIDTH + TILE_GAP),
                    anchor.y + row * (DEFAULT_WINDOW_HEIGHT + TILE_GAP),
                ),
                default_window_size(),
            )
        })
        .collect()
}

/// Square-ish grid centred on the canvas centre.
pub fn tile_rects(count: usize) -> Vec<CanvasRect> {
    if count == 0 {
        return Vec::new();
    }
    let (cols, rows) = grid_dimensions(count);
    let total_width = cols as f64 * DEFAULT_WINDOW_WIDTH + (cols as f64 - 1.0) * TILE_GAP;
    let total_height = rows as f64 * DEFAULT_WINDOW_HEIGHT + (rows as f64 - 1.0) * TILE_GAP;
    let anchor = Point2D::new(
        (CANVAS_SIZE - total_width) / 2.0,
        (CANVAS_SIZE - total_height) / 2.0,
    );
    grid_rects(count, anchor)
}

/// Same grid as [`tile_rects`], anchored at `anchor` instead of centred.
pub fn grid_arrange_rects(count: usize, anchor: CanvasPoint) -> Vec<CanvasRect> {
    if count == 0 {
        return Vec::new();
    }
    grid_rects(count, anchor)
}
