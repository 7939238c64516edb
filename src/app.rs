// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session controller.
//!
//! This module owns the annotation session and its collaborators and
//! runs the line-oriented command loop: one command is read, validated,
//! and dispatched per iteration, with a wall-clock autosave check at
//! the top of each pass. Invalid operator input is reported and the
//! loop simply prompts again; it never ends the session.

use crate::io::export::{self, ExportOptions};
use crate::io::frames::FrameSource;
use crate::io::serialization;
use crate::models::session::{NavCommand, Session};
use crate::track::detect::Detector;
use crate::track::propagate::{self, StopReason};
use crate::track::tracker::Tracker;
use crate::util::geometry;
use anyhow::Result;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Autosaves are attempted at most once per this window.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Default autosave target in the working directory.
pub const AUTOSAVE_FILE: &str = "autosave.json";

/// Monotonic time for autosave gating, injected so tests can drive it.
pub trait Clock {
    /// Time elapsed since some fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock measured from process start.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Operator input that did not parse; reported and re-prompted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("expected a number, got {0:?}")]
    NotANumber(String),
    #[error("missing {0}")]
    Missing(&'static str),
}

fn parse_arg<T: FromStr>(arg: Option<&str>, what: &'static str) -> Result<T, InputError> {
    let arg = arg.ok_or(InputError::Missing(what))?;
    arg.parse().map_err(|_| InputError::NotANumber(arg.to_string()))
}

fn read_trimmed(input: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// The annotation session plus its collaborators and the command loop.
pub struct AnnotatorApp {
    session: Session,
    source: Box<dyn FrameSource>,
    tracker: Box<dyn Tracker>,
    detector: Option<Box<dyn Detector>>,
    clock: Box<dyn Clock>,
    autosave_path: PathBuf,
    last_autosave: Duration,
}

impl AnnotatorApp {
    pub fn new(
        session: Session,
        source: Box<dyn FrameSource>,
        tracker: Box<dyn Tracker>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let last_autosave = clock.now();
        Self {
            session,
            source,
            tracker,
            detector: None,
            clock,
            autosave_path: AUTOSAVE_FILE.into(),
            last_autosave,
        }
    }

    /// Attach an object detector for assisted selection.
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn set_autosave_path(&mut self, path: PathBuf) {
        self.autosave_path = path;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the command loop until `q` or end of input.
    ///
    /// Commands: `p`/`n` step one frame, `b`/`f` step one second,
    /// `-`/`+` jump to the adjacent keyframe, `m x y dx dy` store a
    /// selection rectangle, `y` pick from detector candidates,
    /// `t target` propagate (`0` = to the end), `c start end` clear a
    /// range, `g` report coverage gaps, `s [name]` save,
    /// `e dir interval [scale]` export, `q` quit.
    pub fn run(&mut self, input: &mut dyn BufRead) -> Result<()> {
        log::info!(
            "session on {}: {} frames, {}x{}, {} fps, {} keyframes",
            self.session.video_path,
            self.session.total_frames,
            self.session.frame_width,
            self.session.frame_height,
            self.session.framerate,
            self.session.keyframes().len(),
        );
        let mut line = String::new();
        loop {
            self.maybe_autosave();
            self.print_status();
            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if self.dispatch(line.trim(), input) {
                return Ok(());
            }
        }
    }

    /// Save to the autosave file if the window has elapsed. At most one
    /// attempt per window; a failed attempt still consumes it.
    pub fn maybe_autosave(&mut self) -> bool {
        let now = self.clock.now();
        if now.saturating_sub(self.last_autosave) < AUTOSAVE_INTERVAL {
            return false;
        }
        self.last_autosave = now;
        match serialization::save_project(&self.session.project_data(), &self.autosave_path) {
            Ok(()) => log::info!("autosaved to {}", self.autosave_path.display()),
            Err(err) => log::error!("autosave failed: {err}"),
        }
        true
    }

    fn print_status(&self) {
        let current = self.session.current_frame();
        let seconds = current as f64 / self.session.framerate.max(1) as f64;
        match self.session.annotations.get(current) {
            Some(bbox) => println!(
                "frame {current} ({seconds:.3}s)  box [{}, {}, {}, {}]",
                bbox.x, bbox.y, bbox.w, bbox.h
            ),
            None => println!("frame {current} ({seconds:.3}s)  unannotated"),
        }
    }

    /// Returns true when the operator quits.
    fn dispatch(&mut self, line: &str, input: &mut dyn BufRead) -> bool {
        let mut args = line.split_whitespace();
        let Some(command) = args.next() else {
            return false;
        };
        let outcome = match command {
            "q" => return true,
            "p" => self.go(NavCommand::PrevFrame),
            "n" => self.go(NavCommand::NextFrame),
            "b" => self.go(NavCommand::BackSecond),
            "f" => self.go(NavCommand::ForwardSecond),
            "-" => self.go(NavCommand::PrevKeyframe),
            "+" => self.go(NavCommand::NextKeyframe),
            "m" => self.handle_manual(&mut args),
            "c" => self.handle_clear(&mut args),
            "g" => self.report_gaps(),
            "t" => self.handle_track(&mut args),
            "y" => self.handle_detect(input),
            "s" => self.handle_save(&mut args),
            "e" => self.handle_export(&mut args, input),
            _ => {
                println!("unknown command: {command}");
                Ok(())
            }
        };
        if let Err(err) = outcome {
            println!("{err}");
        }
        false
    }

    fn go(&mut self, command: NavCommand) -> Result<(), InputError> {
        let frame = self.session.navigate(command);
        self.session.jump_to(frame);
        Ok(())
    }

    fn handle_manual<'a>(
        &mut self,
        args: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), InputError> {
        let ix: i32 = parse_arg(args.next(), "x")?;
        let iy: i32 = parse_arg(args.next(), "y")?;
        let dx: i32 = parse_arg(args.next(), "width")?;
        let dy: i32 = parse_arg(args.next(), "height")?;
        let (x, y, w, h) = geometry::drag_to_top_left(ix, iy, dx, dy);
        let bbox =
            geometry::clamp_to_frame(x, y, w, h, self.session.frame_width, self.session.frame_height);
        self.session.annotations.set(self.session.current_frame(), bbox);
        println!("stored box [{}, {}, {}, {}]", bbox.x, bbox.y, bbox.w, bbox.h);
        Ok(())
    }

    fn handle_clear<'a>(
        &mut self,
        args: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), InputError> {
        let start = parse_arg(args.next(), "range start")?;
        let end = parse_arg(args.next(), "range end")?;
        self.session.clear_range(start, end);
        println!("cleared frames {}..={}", start.min(end), end.max(start));
        Ok(())
    }

    fn report_gaps(&mut self) -> Result<(), InputError> {
        let mut clean = true;
        for (start, end) in self.session.coverage_gaps() {
            clean = false;
            println!("  frames {start}..={end} unannotated");
        }
        if clean {
            println!("every frame is annotated");
        }
        Ok(())
    }

    fn handle_track<'a>(
        &mut self,
        args: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), InputError> {
        let target = parse_arg(args.next(), "target frame (0 = to the end)")?;
        let from = self.session.current_frame();
        let result = propagate::propagate(
            &mut self.session,
            self.source.as_mut(),
            self.tracker.as_mut(),
            from,
            target,
        );
        match result {
            Ok(summary) => match summary.stop {
                StopReason::ReachedTarget => {
                    println!("tracked {} frames, now at {}", summary.tracked.len(), summary.last_frame)
                }
                StopReason::TargetLost(frame) => {
                    println!("tracker lost the target at frame {frame}; last good frame {}", summary.last_frame)
                }
                StopReason::FrameUnavailable(frame) => {
                    println!("frame {frame} unavailable; stopped at {}", summary.last_frame)
                }
            },
            Err(err) => println!("{err}"),
        }
        Ok(())
    }

    fn handle_detect(&mut self, input: &mut dyn BufRead) -> Result<(), InputError> {
        let current = self.session.current_frame();
        let Some(detector) = self.detector.as_mut() else {
            println!("no detector configured");
            return Ok(());
        };
        let frame = match self.source.seek_read(current) {
            Ok(frame) => frame,
            Err(err) => {
                println!("{err}");
                return Ok(());
            }
        };
        let candidates = detector.detect(&frame);
        if candidates.is_empty() {
            println!("no objects detected");
            return Ok(());
        }
        for (idx, candidate) in candidates.iter().enumerate() {
            let bbox = candidate.to_top_left();
            println!("{idx}: [{}, {}, {}, {}]", bbox.x, bbox.y, bbox.w, bbox.h);
        }
        println!("pick a candidate index (q to cancel):");
        while let Some(pick) = read_trimmed(input) {
            if pick == "q" {
                return Ok(());
            }
            match pick.parse::<usize>() {
                Ok(idx) if idx < candidates.len() => {
                    let raw = candidates[idx].to_top_left();
                    let bbox = geometry::clamp_to_frame(
                        raw.x,
                        raw.y,
                        raw.w,
                        raw.h,
                        self.session.frame_width,
                        self.session.frame_height,
                    );
                    self.session.annotations.set(current, bbox);
                    println!("stored candidate {idx} as [{}, {}, {}, {}]", bbox.x, bbox.y, bbox.w, bbox.h);
                    return Ok(());
                }
                _ => println!("no candidate {pick:?}, try again (q to cancel):"),
            }
        }
        Ok(())
    }

    fn handle_save<'a>(
        &mut self,
        args: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), InputError> {
        let mut filename = args.next().unwrap_or("project").to_string();
        if !filename.ends_with(".json") {
            filename.push_str(".json");
        }
        match serialization::save_project(&self.session.project_data(), Path::new(&filename)) {
            Ok(()) => {
                log::info!("saved project to {filename}");
                println!("saved {filename}");
            }
            // Fatal for this command only; the session stays savable.
            Err(err) => println!("save failed: {err}"),
        }
        Ok(())
    }

    fn handle_export<'a>(
        &mut self,
        args: &mut impl Iterator<Item = &'a str>,
        input: &mut dyn BufRead,
    ) -> Result<(), InputError> {
        let dir = args.next().ok_or(InputError::Missing("output directory"))?.to_string();
        let interval = parse_arg(args.next(), "frame interval")?;
        let scale = match args.next() {
            Some(arg) => parse_arg(Some(arg), "scale factor")?,
            None => 1.0,
        };
        let options = match ExportOptions::new(interval, scale) {
            Ok(options) => options,
            Err(err) => {
                println!("{err}");
                return Ok(());
            }
        };

        let gaps: Vec<_> = self.session.coverage_gaps().collect();
        if !gaps.is_empty() {
            println!("{} unannotated ranges:", gaps.len());
            for (start, end) in gaps.iter().take(10) {
                println!("  frames {start}..={end}");
            }
            if gaps.len() > 10 {
                println!("  ... and {} more", gaps.len() - 10);
            }
            println!("export anyway? [y/N]");
            if read_trimmed(input).as_deref() != Some("y") {
                println!("export cancelled");
                return Ok(());
            }
        }

        match export::export_dataset(&self.session, self.source.as_mut(), Path::new(&dir), options)
        {
            Ok(report) => println!(
                "wrote {} image/label pairs ({} windows skipped, {} read failures)",
                report.written, report.skipped_windows, report.failed_reads
            ),
            Err(err) => println!("export failed: {err}"),
        }
        Ok(())
    }
}
