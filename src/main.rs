// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! VIDROI binary entry point.
//!
//! Opens a frame directory (or resumes a saved project), wires the
//! collaborators, and hands control to the session command loop.

use anyhow::{bail, Context, Result};
use std::path::Path;
use vidroi::app::{AnnotatorApp, SystemClock};
use vidroi::io::frames::{FrameSource, ImageDirSource};
use vidroi::io::probe::{KeyframeExtractor, PictTypeLog};
use vidroi::io::serialization;
use vidroi::models::session::Session;
use vidroi::track::tracker::StaticTracker;

const DEFAULT_FRAMERATE: usize = 30;

fn keyframes_for(frames_dir: &Path) -> Vec<usize> {
    match PictTypeLog.extract(frames_dir) {
        Ok(keyframes) => {
            log::info!("{} keyframes from picture-type report", keyframes.len());
            keyframes
        }
        Err(err) => {
            log::warn!("no keyframe report: {err:#}");
            Vec::new()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: vidroi <frames-dir | project.json> [framerate]");
    };
    let framerate = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("framerate must be an integer, got {arg:?}"))?,
        None => DEFAULT_FRAMERATE,
    };

    let (source, session) = if path.ends_with(".json") {
        let data = serialization::load_project(Path::new(&path))
            .with_context(|| format!("failed to open project {path}"))?;
        let frames_dir = Path::new(&data.video_path).to_path_buf();
        let source = ImageDirSource::open(&frames_dir, framerate)?;
        let keyframes = keyframes_for(&frames_dir);
        let session = Session::from_project(data, source.metadata(), keyframes);
        (source, session)
    } else {
        let frames_dir = Path::new(&path);
        let source = ImageDirSource::open(frames_dir, framerate)?;
        let keyframes = keyframes_for(frames_dir);
        let session = Session::new(path.clone(), source.metadata(), keyframes);
        (source, session)
    };

    let mut app = AnnotatorApp::new(
        session,
        Box::new(source),
        Box::new(StaticTracker::default()),
        Box::new(SystemClock::new()),
    );
    app.run(&mut std::io::stdin().lock())
}
