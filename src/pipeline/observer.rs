//! Optional per-frame observation hooks.
//!
//! Observers are injected into the driver and see every emitted frame's
//! numbers. They cannot influence the pipeline.

use super::RunSummary;
use crate::analysis::SweepResult;
use std::time::{Duration, Instant};

/// What the driver knows about one emitted frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameReport<'a> {
    /// 1-based index of the source frame.
    pub index: u64,
    /// Sweep result; empty for the first frame.
    pub sweep: &'a SweepResult,
    /// Severity score (0 for the first frame).
    pub severity: f64,
    /// `Some(true)` if the freeze criteria judged the frame static.
    pub is_static: Option<bool>,
    /// Time spent analyzing and rendering the frame.
    pub elapsed: Duration,
}

/// Receives a report for each frame written.
pub trait FrameObserver {
    /// Called after the frame has been written to the sink.
    fn on_frame(&mut self, report: &FrameReport<'_>);

    /// Called once when the run ends without error.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Logs throughput every `interval` frames.
pub struct ThroughputLogger {
    interval: u64,
    total_frames: u64,
    window_start: Instant,
    window_frames: u64,
    busy: Duration,
}

impl ThroughputLogger {
    /// `total_frames` is the expected stream length, 0 if unknown.
    pub fn new(interval: u64, total_frames: u64) -> Self {
        Self {
            interval: interval.max(1),
            total_frames,
            window_start: Instant::now(),
            window_frames: 0,
            busy: Duration::ZERO,
        }
    }

    /// Frames per second over a window; 0 for an empty window.
    pub fn rate(frames: u64, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if frames == 0 || secs <= 0.0 {
            return 0.0;
        }
        frames as f64 / secs
    }
}

impl FrameObserver for ThroughputLogger {
    fn on_frame(&mut self, report: &FrameReport<'_>) {
        self.window_frames += 1;
        self.busy += report.elapsed;
        if self.window_frames < self.interval {
            return;
        }

        let fps = Self::rate(self.window_frames, self.window_start.elapsed());
        let pipeline_fps = Self::rate(self.window_frames, self.busy);
        if self.total_frames > 0 {
            tracing::info!(
                frame = report.index,
                total = self.total_frames,
                fps = format_args!("{fps:.1}"),
                pipeline_fps = format_args!("{pipeline_fps:.1}"),
                "Progress"
            );
        } else {
            tracing::info!(
                frame = report.index,
                fps = format_args!("{fps:.1}"),
                pipeline_fps = format_args!("{pipeline_fps:.1}"),
                "Progress"
            );
        }

        self.window_start = Instant::now();
        self.window_frames = 0;
        self.busy = Duration::ZERO;
    }
}
