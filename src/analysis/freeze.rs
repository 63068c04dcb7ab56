//! Frozen-footage detection.
//!
//! Tracks runs of near-static frames and reports them as segments.
//! Detection is observational only: it never changes rendered frames.

use super::sweep::SweepResult;
use serde::{Deserialize, Serialize};

/// When a frame counts as static and how many make a frozen segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeCriteria {
    /// Bucket threshold whose occupancy is inspected.
    pub threshold: u8,
    /// A frame is static when at most this percentage of pixels exceed `threshold`.
    pub max_moving_percent: f64,
    /// Consecutive static frames required before a segment is reported.
    pub min_run: u64,
}

impl Default for FreezeCriteria {
    fn default() -> Self {
        Self {
            threshold: 5,
            max_moving_percent: 0.5,
            min_run: 12,
        }
    }
}

impl FreezeCriteria {
    /// Returns `None` without data, otherwise whether the frame is static.
    pub fn is_static(&self, sweep: &SweepResult) -> Option<bool> {
        if sweep.is_empty() {
            return None;
        }
        let count = sweep.count_at(self.threshold)?;
        let moving = count as f64 / sweep.total_pixels() as f64 * 100.0;
        Some(moving <= self.max_moving_percent)
    }
}

/// A closed run of static frames, by source frame index (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrozenSegment {
    pub start_frame: u64,
    pub end_frame: u64,
}

impl FrozenSegment {
    /// Number of frames in the segment.
    pub fn frame_count(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }
}

/// Running freeze state for one stream.
#[derive(Debug)]
pub struct FreezeMonitor {
    criteria: FreezeCriteria,
    /// First frame of the current static run.
    run_start: Option<u64>,
    /// Last static frame seen.
    last_static: u64,
    /// Length of the current static run.
    run_length: u64,
    static_frames: u64,
    segments: Vec<FrozenSegment>,
}

impl FreezeMonitor {
    pub fn new(criteria: FreezeCriteria) -> Self {
        Self {
            criteria,
            run_start: None,
            last_static: 0,
            run_length: 0,
            static_frames: 0,
            segments: Vec::new(),
        }
    }

    /// Feeds the sweep of frame `index`; returns whether it was static.
    pub fn observe(&mut self, index: u64, sweep: &SweepResult) -> Option<bool> {
        let is_static = self.criteria.is_static(sweep)?;

        if is_static {
            self.static_frames += 1;
            self.run_length += 1;
            self.last_static = index;
            let start = *self.run_start.get_or_insert(index);
            if self.run_length == self.criteria.min_run {
                tracing::warn!(start_frame = start, frames = self.run_length, "Footage appears frozen");
            }
        } else {
            self.close_run();
        }
        Some(is_static)
    }

    /// True while the current static run is long enough to be a segment.
    pub fn is_frozen(&self) -> bool {
        self.run_length >= self.criteria.min_run
    }

    /// Total static frames seen.
    pub fn static_frames(&self) -> u64 {
        self.static_frames
    }

    /// Segments closed so far.
    pub fn segments(&self) -> &[FrozenSegment] {
        &self.segments
    }

    /// Closes any open run and takes every segment recorded so far.
    pub fn finish(&mut self) -> Vec<FrozenSegment> {
        self.close_run();
        std::mem::take(&mut self.segments)
    }

    fn close_run(&mut self) {
        if let Some(start) = self.run_start.take() {
            if self.run_length >= self.criteria.min_run {
                let segment = FrozenSegment {
                    start_frame: start,
                    end_frame: self.last_static,
                };
                tracing::info!(
                    start_frame = segment.start_frame,
                    end_frame = segment.end_frame,
                    frames = segment.frame_count(),
                    "Frozen segment ended"
                );
                self.segments.push(segment);
            }
        }
        self.run_length = 0;
    }
}

impl Default for FreezeMonitor {
    fn default() -> Self {
        Self::new(FreezeCriteria::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiffFrame, ThresholdSweep};
    use crate::video::Frame;

    fn sweep_with_motion(moving: bool) -> SweepResult {
        let a = Frame::filled(10, 10, [0, 0, 0], 1);
        let b = Frame::filled(10, 10, if moving { [90, 0, 0] } else { [3, 3, 3] }, 2);
        ThresholdSweep::new().analyze(&DiffFrame::compute(&a, &b).unwrap())
    }

    fn criteria(min_run: u64) -> FreezeCriteria {
        FreezeCriteria {
            min_run,
            ..FreezeCriteria::default()
        }
    }

    #[test]
    fn test_no_data_is_neither() {
        let mut monitor = FreezeMonitor::default();
        assert_eq!(monitor.observe(1, &SweepResult::empty()), None);
        assert_eq!(monitor.static_frames(), 0);
    }

    #[test]
    fn test_short_static_run_not_reported() {
        let mut monitor = FreezeMonitor::new(criteria(3));
        let still = sweep_with_motion(false);
        let moving = sweep_with_motion(true);

        monitor.observe(2, &still);
        monitor.observe(3, &still);
        monitor.observe(4, &moving);

        assert!(monitor.segments().is_empty());
        assert_eq!(monitor.static_frames(), 2);
    }

    #[test]
    fn test_segment_closed_by_motion() {
        let mut monitor = FreezeMonitor::new(criteria(2));
        let still = sweep_with_motion(false);
        let moving = sweep_with_motion(true);

        monitor.observe(2, &moving);
        monitor.observe(3, &still);
        monitor.observe(4, &still);
        assert!(monitor.is_frozen());
        monitor.observe(5, &still);
        monitor.observe(6, &moving);
        assert!(!monitor.is_frozen());

        assert_eq!(
            monitor.segments(),
            &[FrozenSegment {
                start_frame: 3,
                end_frame: 5
            }]
        );
    }

    #[test]
    fn test_open_segment_closed_on_finish() {
        let mut monitor = FreezeMonitor::new(criteria(2));
        let still = sweep_with_motion(false);

        for i in 2..=6 {
            monitor.observe(i, &still);
        }
        let segments = monitor.finish();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].frame_count(), 5);
    }
}
