// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the transforms between box coordinate formats:
//! the clamp that keeps a box inside the frame, the conversion to
//! center-relative fractional coordinates used by the label format, and
//! the rounding rule for importing center-form detector output.

use crate::models::annotation::BoundingBox;

/// Clamp a box so it lies fully inside a `frame_w` x `frame_h` frame.
///
/// This is the single validity transform for stored boxes: every
/// box-producing operation (manual selection, detector pick, tracker
/// update) passes through here before the result reaches the store.
/// An edge overhang is cut off rather than shifted; a box driven to
/// zero size is floored to 1x1.
pub fn clamp_to_frame(x: i32, y: i32, w: i32, h: i32, frame_w: u32, frame_h: u32) -> BoundingBox {
    let fw = frame_w as i32;
    let fh = frame_h as i32;
    let (mut x, mut y, mut w, mut h) = (x, y, w, h);

    if x < 0 {
        w += x;
        x = 0;
    }
    if y < 0 {
        h += y;
        y = 0;
    }
    if w < 1 {
        w = 1;
    }
    if h < 1 {
        h = 1;
    }
    if x > fw - 1 {
        x = fw - 1;
    }
    if y > fh - 1 {
        y = fh - 1;
    }
    if x + w > fw {
        w = fw - x;
    }
    if y + h > fh {
        h = fh - y;
    }

    BoundingBox { x, y, w, h }
}

/// Normalize a drag rectangle whose extent may be negative (dragged up
/// or to the left) into top-left/width/height form.
pub fn drag_to_top_left(ix: i32, iy: i32, dx: i32, dy: i32) -> (i32, i32, i32, i32) {
    let (x, w) = if dx < 0 { (ix + dx, -dx) } else { (ix, dx) };
    let (y, h) = if dy < 0 { (iy + dy, -dy) } else { (iy, dy) };
    (x, y, w, h)
}

/// Convert an absolute top-left box to center-relative fractional
/// coordinates against the given image dimensions.
///
/// All four outputs lie in `[0, 1]` for a box that fits the image.
pub fn to_relative_center(bbox: BoundingBox, img_w: u32, img_h: u32) -> (f64, f64, f64, f64) {
    let iw = img_w as f64;
    let ih = img_h as f64;
    let cx = (bbox.x as f64 + bbox.w as f64 / 2.0) / iw;
    let cy = (bbox.y as f64 + bbox.h as f64 / 2.0) / ih;
    let rw = bbox.w as f64 / iw;
    let rh = bbox.h as f64 / ih;
    (cx, cy, rw, rh)
}

/// Convert a center-form float box (detector output) to an integer
/// top-left box.
///
/// The bottom-right corner is rounded first, then the top-left, and the
/// extent is recomputed as the corner difference so the two corners
/// round independently instead of sharing one accumulated error.
pub fn center_to_top_left(cx: f64, cy: f64, w: f64, h: f64) -> BoundingBox {
    let x = cx - w / 2.0;
    let y = cy - h / 2.0;
    let x2 = (x + w).round() as i32;
    let y2 = (y + h).round() as i32;
    let x = x.round() as i32;
    let y = y.round() as i32;
    BoundingBox {
        x,
        y,
        w: x2 - x,
        h: y2 - y,
    }
}
