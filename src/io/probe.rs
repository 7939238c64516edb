// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyframe index extraction.
//!
//! Which frames are keyframes (independently decodable I-frames) is
//! decided by an external analysis pass, typically
//! `ffprobe -select_streams v -show_entries frame=pict_type -of csv=p=0`.
//! The engine consumes that pass's captured output: a whitespace-
//! separated picture-type token per frame, keyframes marked `I`.

use anyhow::{Context, Result};
use std::path::Path;

/// Produces the sorted keyframe position list for a video.
pub trait KeyframeExtractor {
    fn extract(&self, video_path: &Path) -> Result<Vec<usize>>;
}

/// Reads a captured picture-type report from `<frames dir>/pict_types.log`.
pub struct PictTypeLog;

/// Sidecar file name expected next to the frame images.
pub const PICT_TYPE_LOG: &str = "pict_types.log";

impl KeyframeExtractor for PictTypeLog {
    fn extract(&self, video_path: &Path) -> Result<Vec<usize>> {
        let path = video_path.join(PICT_TYPE_LOG);
        let report = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(parse_pict_types(&report))
    }
}

/// Frame positions whose picture type is `I`.
pub fn parse_pict_types(report: &str) -> Vec<usize> {
    report
        .split_whitespace()
        .enumerate()
        .filter(|(_, pict_type)| *pict_type == "I")
        .map(|(frame, _)| frame)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marks_i_frames() {
        assert_eq!(parse_pict_types("I\nP\nP\nB\nI\nP\n"), vec![0, 4]);
    }

    #[test]
    fn test_parse_all_predicted() {
        assert!(parse_pict_types("P P B P").is_empty());
    }

    #[test]
    fn test_parse_empty_report() {
        assert!(parse_pict_types("").is_empty());
    }
}
