// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project file serialization and deserialization.
//!
//! The project file is a single JSON document holding the media path,
//! the current frame, and the annotation map (frame indices as string
//! keys). Loading a saved file and re-saving it yields the same
//! logical content.

use crate::models::project::ProjectData;
use std::path::Path;
use thiserror::Error;

/// Failure while persisting or restoring a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed document or required fields absent.
    #[error("corrupt project file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Write a project as JSON, overwriting any existing file at `path`.
pub fn save_project(data: &ProjectData, path: &Path) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a project back from JSON.
pub fn load_project(path: &Path) -> Result<ProjectData, ProjectError> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::BoundingBox;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("vidroi-ser-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut data = ProjectData::new("clips/run.mp4".into());
        data.current_frame = 42;
        data.annotations.set(10, BoundingBox { x: 5, y: 5, w: 20, h: 20 });
        data.annotations.set(11, BoundingBox { x: 6, y: 5, w: 20, h: 21 });

        let path = temp_path("roundtrip.json");
        save_project(&data, &path).unwrap();
        let restored = load_project(&path).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let path = temp_path("overwrite.json");
        let first = ProjectData::new("a.mp4".into());
        let second = ProjectData::new("b.mp4".into());
        save_project(&first, &path).unwrap();
        save_project(&second, &path).unwrap();
        assert_eq!(load_project(&path).unwrap(), second);
    }

    #[test]
    fn test_load_rejects_missing_fields() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, r#"{"video_path": "a.mp4"}"#).unwrap();
        assert!(matches!(load_project(&path), Err(ProjectError::Corrupt(_))));
    }

    #[test]
    fn test_load_parses_string_frame_keys() {
        let path = temp_path("keys.json");
        std::fs::write(
            &path,
            r#"{"video_path": "a.mp4", "current_frame": 3, "annotations": {"12": [5, 5, 20, 20]}}"#,
        )
        .unwrap();
        let data = load_project(&path).unwrap();
        assert_eq!(data.annotations.get(12), Some(BoundingBox { x: 5, y: 5, w: 20, h: 20 }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = temp_path("does-not-exist.json");
        assert!(matches!(load_project(&path), Err(ProjectError::Io(_))));
    }
}
