// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame access for media files.
//!
//! Video decoding itself is an external concern; the engine only needs
//! seek-by-index frame retrieval behind the [`FrameSource`] trait. The
//! built-in implementation reads a directory of numbered frame images
//! (as produced by e.g. `ffmpeg -i clip.mp4 frame_%06d.jpg`).

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decoded frame pixel data.
pub type Frame = RgbImage;

/// Fixed per-video facts reported by a frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub total_frames: usize,
    pub framerate: usize,
    pub width: u32,
    pub height: u32,
}

/// A frame could not be delivered.
#[derive(Debug, Error)]
pub enum FrameReadError {
    #[error("frame {0} is out of range")]
    OutOfRange(usize),
    #[error("failed to decode frame {frame}: {source}")]
    Decode {
        frame: usize,
        source: image::ImageError,
    },
}

/// Seekable frame access plus the video's fixed metadata.
pub trait FrameSource {
    fn metadata(&self) -> VideoMetadata;

    /// Seek to a frame index and decode it.
    fn seek_read(&mut self, frame: usize) -> Result<Frame, FrameReadError>;
}

/// Frame source backed by a directory of `frame_%06d.jpg` images.
pub struct ImageDirSource {
    dir: PathBuf,
    meta: VideoMetadata,
}

impl ImageDirSource {
    /// Open a frame directory, counting frames and probing dimensions
    /// from the first image.
    pub fn open(dir: &Path, framerate: usize) -> anyhow::Result<Self> {
        let total_frames = (0..)
            .take_while(|frame| dir.join(frame_file(*frame)).exists())
            .count();
        if total_frames == 0 {
            anyhow::bail!("no frame_000000.jpg found in {}", dir.display());
        }
        let (width, height) = image::image_dimensions(dir.join(frame_file(0)))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            meta: VideoMetadata {
                total_frames,
                framerate,
                width,
                height,
            },
        })
    }
}

impl FrameSource for ImageDirSource {
    fn metadata(&self) -> VideoMetadata {
        self.meta
    }

    fn seek_read(&mut self, frame: usize) -> Result<Frame, FrameReadError> {
        if frame >= self.meta.total_frames {
            return Err(FrameReadError::OutOfRange(frame));
        }
        let path = self.dir.join(frame_file(frame));
        let img = image::open(path).map_err(|source| FrameReadError::Decode { frame, source })?;
        Ok(img.to_rgb8())
    }
}

/// File name for a frame index, shared with the export layout.
pub fn frame_file(frame: usize) -> String {
    format!("frame_{frame:06}.jpg")
}
