// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! This module defines the persisted form of an annotation session:
//! the media path, the frame the operator was on, and the per-frame
//! boxes. Everything else (dimensions, framerate, keyframes) is
//! re-derived from the media when the project is reopened.

use crate::models::annotation::AnnotationStore;
use serde::{Deserialize, Serialize};

/// Complete project data for serialization.
///
/// All three fields are required on load; a document missing any of
/// them is rejected as corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub video_path: String,
    pub current_frame: usize,
    pub annotations: AnnotationStore,
}

impl ProjectData {
    /// Create an empty project for the given media path.
    pub fn new(video_path: String) -> Self {
        Self {
            video_path,
            current_frame: 0,
            annotations: AnnotationStore::new(),
        }
    }
}
