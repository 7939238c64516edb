// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracker-driven annotation propagation.
//!
//! Extends a seed annotation across a frame range by feeding the
//! tracker one frame at a time. Strictly sequential: each update
//! depends on the tracker state left by the previous one.

use crate::io::frames::{FrameReadError, FrameSource};
use crate::models::annotation::BoundingBox;
use crate::models::session::Session;
use crate::track::tracker::Tracker;
use crate::util::geometry;
use thiserror::Error;

/// Why a propagation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Walked the whole requested range.
    ReachedTarget,
    /// The tracker reported the target lost at this frame. A normal
    /// termination, not an error; earlier frames keep their boxes.
    TargetLost(usize),
    /// The source could not deliver this frame.
    FrameUnavailable(usize),
}

/// Outcome of one propagation run.
#[derive(Debug, Clone)]
pub struct PropagationSummary {
    /// Last frame that holds a box after the run (the seed frame if no
    /// frame was tracked). The session's current frame ends up here.
    pub last_frame: usize,
    /// Boxes stored, in frame order.
    pub tracked: Vec<(usize, BoundingBox)>,
    pub stop: StopReason,
}

/// Propagation could not start.
#[derive(Debug, Error)]
pub enum PropagateError {
    #[error("frame {0} has no annotation to seed the tracker")]
    NoSeed(usize),
    #[error("failed to read the seed frame: {0}")]
    SeedFrame(#[from] FrameReadError),
}

/// Propagate the annotation on `from` forward through `track_to`
/// (exclusive). `track_to == 0` means "to the end of the video".
///
/// Each successfully tracked box is clamped and stored as it is
/// produced; on tracker loss or a failed frame read the run stops and
/// later frames are left exactly as they were. The session's current
/// frame is advanced to the last frame that was reached.
pub fn propagate(
    session: &mut Session,
    source: &mut dyn FrameSource,
    tracker: &mut dyn Tracker,
    from: usize,
    track_to: usize,
) -> Result<PropagationSummary, PropagateError> {
    let seed = session
        .annotations
        .get(from)
        .ok_or(PropagateError::NoSeed(from))?;
    let seed_frame = source.seek_read(from)?;
    tracker.init(&seed_frame, seed);

    let target = if track_to == 0 {
        session.total_frames
    } else {
        track_to.min(session.total_frames)
    };

    let mut tracked = Vec::new();
    let mut last_frame = from;
    let mut stop = StopReason::ReachedTarget;
    for frame_idx in (from + 1)..target {
        let frame = match source.seek_read(frame_idx) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("propagation stopped, frame {frame_idx} unavailable: {err}");
                stop = StopReason::FrameUnavailable(frame_idx);
                break;
            }
        };
        match tracker.update(&frame) {
            Some(raw) => {
                let bbox = geometry::clamp_to_frame(
                    raw.x,
                    raw.y,
                    raw.w,
                    raw.h,
                    session.frame_width,
                    session.frame_height,
                );
                session.annotations.set(frame_idx, bbox);
                tracked.push((frame_idx, bbox));
                last_frame = frame_idx;
                log::debug!("tracked frame {frame_idx}: {bbox:?}");
            }
            None => {
                log::info!("tracker lost the target at frame {frame_idx}");
                stop = StopReason::TargetLost(frame_idx);
                break;
            }
        }
    }

    session.jump_to(last_frame);
    Ok(PropagationSummary {
        last_frame,
        tracked,
        stop,
    })
}
