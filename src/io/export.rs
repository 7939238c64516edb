// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset export.
//!
//! This module samples annotated frames at a fixed interval and writes
//! them as a paired image/label dataset:
//!
//! ```text
//! <output dir>/
//!   images/frame_000000.jpg
//!   labels/frame_000000.txt    "0 cx cy rw rh", 8 decimal places
//!   dataset.yaml
//! ```
//!
//! Labels use class 0 and center-relative fractional coordinates, so
//! an optional image rescale needs no label adjustment.

use crate::io::frames::{frame_file, FrameSource};
use crate::models::session::Session;
use crate::util::geometry;
use image::imageops::{self, FilterType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while exporting; leaves the session untouched.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("frame interval must be at least 1")]
    BadInterval,
    #[error("scale factor must be positive and finite")]
    BadScale,
    #[error("failed to create {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to encode dataset manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
}

/// Validated export parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    frame_interval: usize,
    scale: f64,
}

impl ExportOptions {
    /// Validate operator-supplied parameters.
    pub fn new(frame_interval: usize, scale: f64) -> Result<Self, ExportError> {
        if frame_interval < 1 {
            return Err(ExportError::BadInterval);
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ExportError::BadScale);
        }
        Ok(Self { frame_interval, scale })
    }

    pub fn frame_interval(&self) -> usize {
        self.frame_interval
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// What an export run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Image/label pairs written.
    pub written: usize,
    /// Sampling windows with no annotated frame.
    pub skipped_windows: usize,
    /// Selected frames the source failed to deliver.
    pub failed_reads: usize,
}

#[derive(Serialize)]
struct DatasetManifest {
    path: String,
    train: String,
    val: String,
    names: BTreeMap<u32, String>,
}

/// Export the session's annotations as an image/label dataset.
///
/// `[0, total_frames)` is partitioned into consecutive windows of
/// `frame_interval` frames; the first annotated frame of each window is
/// exported, and a window without one is skipped outright rather than
/// borrowing from the next window. Labels are computed from each
/// frame's actual decoded dimensions, before any rescale.
pub fn export_dataset(
    session: &Session,
    source: &mut dyn FrameSource,
    output_dir: &Path,
    options: ExportOptions,
) -> Result<ExportReport, ExportError> {
    let images_dir = output_dir.join("images");
    let labels_dir = output_dir.join("labels");
    for dir in [&images_dir, &labels_dir] {
        fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            dir: dir.clone(),
            source,
        })?;
    }

    let mut report = ExportReport::default();
    for window_start in (0..session.total_frames).step_by(options.frame_interval) {
        let window_end = (window_start + options.frame_interval).min(session.total_frames);
        let Some((frame_idx, bbox)) = session.annotations.first_in(window_start..window_end)
        else {
            report.skipped_windows += 1;
            continue;
        };

        let frame = match source.seek_read(frame_idx) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("skipping frame {frame_idx}: {err}");
                report.failed_reads += 1;
                continue;
            }
        };

        let (img_w, img_h) = frame.dimensions();
        let (cx, cy, rw, rh) = geometry::to_relative_center(bbox, img_w, img_h);
        let label_path = labels_dir.join(format!("frame_{frame_idx:06}.txt"));
        let label = format!("0 {cx:.8} {cy:.8} {rw:.8} {rh:.8}\n");
        fs::write(&label_path, label).map_err(|source| ExportError::Write {
            path: label_path,
            source,
        })?;

        let image_path = images_dir.join(frame_file(frame_idx));
        let frame = if (options.scale - 1.0).abs() > f64::EPSILON {
            let scaled_w = ((img_w as f64 * options.scale).round() as u32).max(1);
            let scaled_h = ((img_h as f64 * options.scale).round() as u32).max(1);
            imageops::resize(&frame, scaled_w, scaled_h, FilterType::CatmullRom)
        } else {
            frame
        };
        frame.save(&image_path).map_err(|source| ExportError::Encode {
            path: image_path,
            source,
        })?;
        report.written += 1;
        log::debug!("exported frame {frame_idx}");
    }

    write_manifest(output_dir)?;
    log::info!(
        "export finished: {} pairs written, {} windows skipped, {} read failures",
        report.written,
        report.skipped_windows,
        report.failed_reads
    );
    Ok(report)
}

fn write_manifest(output_dir: &Path) -> Result<(), ExportError> {
    let manifest = DatasetManifest {
        path: output_dir.display().to_string(),
        train: "images".into(),
        val: "images".into(),
        names: BTreeMap::from([(0, "object".into())]),
    };
    let yaml = serde_yaml::to_string(&manifest)?;
    let path = output_dir.join("dataset.yaml");
    fs::write(&path, yaml).map_err(|source| ExportError::Write { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::frames::{Frame, FrameReadError, VideoMetadata};
    use crate::models::annotation::BoundingBox;

    struct SyntheticSource {
        meta: VideoMetadata,
        fail_at: Option<usize>,
    }

    impl SyntheticSource {
        fn new(total_frames: usize) -> Self {
            Self {
                meta: VideoMetadata {
                    total_frames,
                    framerate: 30,
                    width: 64,
                    height: 48,
                },
                fail_at: None,
            }
        }
    }

    impl FrameSource for SyntheticSource {
        fn metadata(&self) -> VideoMetadata {
            self.meta
        }

        fn seek_read(&mut self, frame: usize) -> Result<Frame, FrameReadError> {
            if frame >= self.meta.total_frames || self.fail_at == Some(frame) {
                return Err(FrameReadError::OutOfRange(frame));
            }
            Ok(Frame::new(self.meta.width, self.meta.height))
        }
    }

    fn session(total_frames: usize) -> Session {
        Session::new("clip.mp4".into(), SyntheticSource::new(total_frames).meta, Vec::new())
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vidroi-export-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_options_reject_bad_inputs() {
        assert!(matches!(ExportOptions::new(0, 1.0), Err(ExportError::BadInterval)));
        assert!(matches!(ExportOptions::new(5, 0.0), Err(ExportError::BadScale)));
        assert!(matches!(ExportOptions::new(5, -2.0), Err(ExportError::BadScale)));
        assert!(matches!(ExportOptions::new(5, f64::NAN), Err(ExportError::BadScale)));
        assert!(ExportOptions::new(1, 0.5).is_ok());
    }

    #[test]
    fn test_window_selects_first_annotated_frame() {
        let mut s = session(10);
        s.annotations.set(2, BoundingBox { x: 10, y: 10, w: 20, h: 10 });
        s.annotations.set(7, BoundingBox { x: 5, y: 5, w: 8, h: 8 });
        let mut source = SyntheticSource::new(10);
        let out = temp_dir("windows");

        let report =
            export_dataset(&s, &mut source, &out, ExportOptions::new(5, 1.0).unwrap()).unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped_windows, 0);
        assert!(out.join("images/frame_000002.jpg").exists());
        assert!(out.join("labels/frame_000002.txt").exists());
        assert!(out.join("images/frame_000007.jpg").exists());
        assert!(out.join("dataset.yaml").exists());
    }

    #[test]
    fn test_empty_window_is_skipped_not_borrowed() {
        let mut s = session(15);
        // Window [0,5) empty, [5,10) has frame 9, [10,15) empty.
        s.annotations.set(9, BoundingBox { x: 0, y: 0, w: 4, h: 4 });
        let mut source = SyntheticSource::new(15);
        let out = temp_dir("skip");

        let report =
            export_dataset(&s, &mut source, &out, ExportOptions::new(5, 1.0).unwrap()).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped_windows, 2);
        assert!(out.join("images/frame_000009.jpg").exists());
    }

    #[test]
    fn test_label_format_has_eight_decimals() {
        let mut s = session(4);
        s.annotations.set(0, BoundingBox { x: 16, y: 12, w: 32, h: 24 });
        let mut source = SyntheticSource::new(4);
        let out = temp_dir("label");

        export_dataset(&s, &mut source, &out, ExportOptions::new(4, 1.0).unwrap()).unwrap();
        let label = fs::read_to_string(out.join("labels/frame_000000.txt")).unwrap();
        // Frame is 64x48: center (32, 24), extent (32, 24).
        assert_eq!(label, "0 0.50000000 0.50000000 0.50000000 0.50000000\n");
    }

    #[test]
    fn test_scale_resamples_image_but_not_label() {
        let mut s = session(1);
        s.annotations.set(0, BoundingBox { x: 16, y: 12, w: 32, h: 24 });
        let mut source = SyntheticSource::new(1);
        let out = temp_dir("scale");

        export_dataset(&s, &mut source, &out, ExportOptions::new(1, 0.5).unwrap()).unwrap();
        let label = fs::read_to_string(out.join("labels/frame_000000.txt")).unwrap();
        assert_eq!(label, "0 0.50000000 0.50000000 0.50000000 0.50000000\n");
        let (w, h) = image::image_dimensions(out.join("images/frame_000000.jpg")).unwrap();
        assert_eq!((w, h), (32, 24));
    }

    #[test]
    fn test_failed_read_skips_frame_and_continues() {
        let mut s = session(10);
        s.annotations.set(1, BoundingBox { x: 0, y: 0, w: 4, h: 4 });
        s.annotations.set(6, BoundingBox { x: 0, y: 0, w: 4, h: 4 });
        let mut source = SyntheticSource::new(10);
        source.fail_at = Some(1);
        let out = temp_dir("fail");

        let report =
            export_dataset(&s, &mut source, &out, ExportOptions::new(5, 1.0).unwrap()).unwrap();
        assert_eq!(report.failed_reads, 1);
        assert_eq!(report.written, 1);
        assert!(!out.join("images/frame_000001.jpg").exists());
        assert!(out.join("images/frame_000006.jpg").exists());
    }
}
