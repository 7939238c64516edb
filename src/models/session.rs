// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state and navigation.
//!
//! A session pins the fixed facts about one video (frame count,
//! framerate, dimensions, keyframes) next to the mutable state the
//! operator edits: the current frame and the annotation store.

use crate::io::frames::VideoMetadata;
use crate::models::annotation::AnnotationStore;
use crate::models::coverage::{self, Gaps};
use crate::models::keyframes::{KeyframeIndex, SeekDir};
use crate::models::project::ProjectData;

/// A navigation command; resolved to a frame index by [`Session::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    PrevFrame,
    NextFrame,
    /// One second back (framerate frames).
    BackSecond,
    /// One second forward.
    ForwardSecond,
    PrevKeyframe,
    NextKeyframe,
}

/// State of one annotation session.
pub struct Session {
    pub video_path: String,
    pub total_frames: usize,
    pub framerate: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    keyframes: KeyframeIndex,
    current_frame: usize,
    pub annotations: AnnotationStore,
}

impl Session {
    /// Start a fresh session on a video.
    pub fn new(video_path: String, meta: VideoMetadata, keyframes: Vec<usize>) -> Self {
        Self {
            video_path,
            total_frames: meta.total_frames,
            framerate: meta.framerate,
            frame_width: meta.width,
            frame_height: meta.height,
            keyframes: KeyframeIndex::new(keyframes),
            current_frame: 0,
            annotations: AnnotationStore::new(),
        }
    }

    /// Resume a session from a saved project.
    ///
    /// The persisted current frame is clamped into range in case the
    /// media changed length since the project was saved.
    pub fn from_project(data: ProjectData, meta: VideoMetadata, keyframes: Vec<usize>) -> Self {
        let mut session = Self::new(data.video_path, meta, keyframes);
        session.annotations = data.annotations;
        session.jump_to(data.current_frame);
        session
    }

    /// Snapshot the persisted subset of the session.
    pub fn project_data(&self) -> ProjectData {
        ProjectData {
            video_path: self.video_path.clone(),
            current_frame: self.current_frame,
            annotations: self.annotations.clone(),
        }
    }

    /// The frame the operator is on; always in `[0, total_frames - 1]`.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Move to a frame, clamped into range.
    pub fn jump_to(&mut self, frame: usize) {
        self.current_frame = frame.min(self.total_frames.saturating_sub(1));
    }

    /// Keyframe positions for this video.
    pub fn keyframes(&self) -> &[usize] {
        self.keyframes.as_slice()
    }

    /// Resolve a navigation command to the frame it would land on.
    ///
    /// Pure with respect to the session; the caller decides whether to
    /// `jump_to` the result.
    pub fn navigate(&self, command: NavCommand) -> usize {
        let last = self.total_frames.saturating_sub(1);
        match command {
            NavCommand::PrevFrame => self.current_frame.saturating_sub(1),
            NavCommand::NextFrame => (self.current_frame + 1).min(last),
            NavCommand::BackSecond => self.current_frame.saturating_sub(self.framerate),
            NavCommand::ForwardSecond => (self.current_frame + self.framerate).min(last),
            NavCommand::PrevKeyframe => {
                if self.keyframes.is_empty() {
                    self.current_frame
                } else {
                    self.keyframes.neighbor(self.current_frame, SeekDir::Prev)
                }
            }
            NavCommand::NextKeyframe => {
                if self.keyframes.is_empty() {
                    self.current_frame
                } else {
                    self.keyframes.neighbor(self.current_frame, SeekDir::Next)
                }
            }
        }
    }

    /// Remove annotations in an inclusive frame range.
    ///
    /// Bounds are clamped to the video and reordered if backwards.
    pub fn clear_range(&mut self, start: usize, end: usize) {
        let last = self.total_frames.saturating_sub(1);
        self.annotations.clear_range(start.min(last), end.min(last));
    }

    /// Contiguous unannotated ranges of this video.
    pub fn coverage_gaps(&self) -> Gaps<'_> {
        coverage::gaps(&self.annotations, self.total_frames)
    }
}
