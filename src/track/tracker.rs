// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Visual tracker interface.
//!
//! A tracker is initialized with a seed box on one frame and then asked
//! to follow the target through subsequent frames. Its internal state
//! advances with every update, so updates must be fed frames in order.

use crate::io::frames::Frame;
use crate::models::annotation::BoundingBox;

/// Anything that can follow a box through consecutive frames.
pub trait Tracker {
    /// (Re)initialize on a frame with the box to follow.
    fn init(&mut self, frame: &Frame, seed: BoundingBox);

    /// Advance to the next frame. `None` means the target was lost;
    /// a returned box is raw tracker output and still needs clamping.
    fn update(&mut self, frame: &Frame) -> Option<BoundingBox>;
}

/// Tracker for static-camera footage: assumes the target does not move
/// and echoes the seed box for every frame.
///
/// Also the default when no external tracker is wired in.
#[derive(Debug, Default)]
pub struct StaticTracker {
    seed: Option<BoundingBox>,
}

impl Tracker for StaticTracker {
    fn init(&mut self, _frame: &Frame, seed: BoundingBox) {
        self.seed = Some(seed);
    }

    fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
        self.seed
    }
}
