// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Object detector interface.
//!
//! The detection model is external; the engine only needs a set of
//! candidate boxes for one frame. Detectors report center-form float
//! boxes, which are converted to stored top-left integer form with the
//! corner-rounding rule in `util::geometry`.

use crate::io::frames::Frame;
use crate::models::annotation::BoundingBox;
use crate::util::geometry;

/// A candidate box in center-x/center-y/width/height float form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl CenterBox {
    /// Integer top-left form of this candidate.
    pub fn to_top_left(self) -> BoundingBox {
        geometry::center_to_top_left(self.cx, self.cy, self.w, self.h)
    }
}

/// Anything that proposes candidate boxes for a frame.
pub trait Detector {
    /// Detect objects in a frame; may return no candidates.
    fn detect(&mut self, frame: &Frame) -> Vec<CenterBox>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_box_conversion() {
        let candidate = CenterBox { cx: 50.0, cy: 40.0, w: 20.0, h: 10.0 };
        assert_eq!(candidate.to_top_left(), BoundingBox { x: 40, y: 35, w: 20, h: 10 });
    }
}
