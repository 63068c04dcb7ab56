//! Sequential frame-pair driver.

use super::observer::{FrameObserver, FrameReport};
use super::{PipelineError, RunSummary};
use crate::analysis::{
    severity, DiffFrame, FreezeCriteria, FreezeMonitor, RunStatistics, SweepResult, ThresholdSweep,
};
use crate::config::FileConfig;
use crate::render::{BucketColorizer, FrameCompositor, Layout};
use crate::video::{Frame, FrameError, FrameSink, FrameSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Where the driver is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No frame read yet; the next frame has no predecessor.
    AwaitingFirstFrame,
    /// At least one frame emitted; `previous` holds the last raw frame.
    Steady,
    /// End of stream, stop request or failure. Terminal.
    StreamExhausted,
}

/// Pulls frames one at a time, annotates them and pushes them out.
///
/// Reading, analysis, rendering and writing of a frame all finish
/// before the next frame is read.
pub struct StreamingDriver<S, K> {
    source: S,
    sink: K,
    state: DriverState,
    /// Last raw source frame, owned exclusively by the driver.
    previous: Option<Frame>,
    analyzer: ThresholdSweep,
    colorizer: BucketColorizer,
    compositor: FrameCompositor,
    freeze: FreezeMonitor,
    statistics: RunStatistics,
    observers: Vec<Box<dyn FrameObserver>>,
    stop: Option<Arc<AtomicBool>>,
    frames_read: u64,
    frames_written: u64,
    interrupted: bool,
}

impl<S: FrameSource, K: FrameSink> StreamingDriver<S, K> {
    pub fn new(source: S, sink: K, layout: Layout, freeze: FreezeCriteria) -> Self {
        Self {
            source,
            sink,
            state: DriverState::AwaitingFirstFrame,
            previous: None,
            analyzer: ThresholdSweep::new(),
            colorizer: BucketColorizer::new(),
            compositor: FrameCompositor::new(layout),
            freeze: FreezeMonitor::new(freeze),
            statistics: RunStatistics::new(),
            observers: Vec::new(),
            stop: None,
            frames_read: 0,
            frames_written: 0,
            interrupted: false,
        }
    }

    /// Builds a driver from validated configuration.
    pub fn from_config(source: S, sink: K, config: &FileConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::new(
            source,
            sink,
            config.layout.clone(),
            config.freeze.clone(),
        ))
    }

    /// Adds an observer that sees every emitted frame.
    pub fn with_observer(mut self, observer: Box<dyn FrameObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Stops the run before the next read once `flag` is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Output frame size for the current source.
    pub fn output_dimensions(&self) -> (u32, u32) {
        let info = self.source.info();
        self.compositor.output_dimensions(info.width, info.height)
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Runs one iteration. Returns `false` once the stream is over.
    pub fn step(&mut self) -> Result<bool, PipelineError> {
        if self.state == DriverState::StreamExhausted {
            return Ok(false);
        }
        if self.stop.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
            tracing::info!(frames = self.frames_written, "Stop requested, ending stream");
            self.interrupted = true;
            self.shutdown()?;
            return Ok(false);
        }

        let frame = match self.source.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!(frames = self.frames_read, "End of stream");
                self.shutdown()?;
                return Ok(false);
            }
            Err(e) => {
                self.abort();
                return Err(e.into());
            }
        };

        if let Err(e) = self.process(frame) {
            self.abort();
            return Err(e);
        }
        Ok(true)
    }

    /// Drives the stream to its end.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        while self.step()? {}

        let summary = RunSummary {
            frames_written: self.frames_written,
            interrupted: self.interrupted,
            frozen_segments: self.freeze.finish(),
            static_frames: self.freeze.static_frames(),
            statistics: self.statistics.clone(),
        };
        for observer in &mut self.observers {
            observer.on_finish(&summary);
        }
        tracing::info!(
            frames = summary.frames_written,
            frozen_segments = summary.frozen_segments.len(),
            mean_severity = summary.statistics.mean_severity(),
            peak_severity = summary.statistics.peak_severity,
            "Run complete"
        );
        Ok(summary)
    }

    fn process(&mut self, frame: Frame) -> Result<(), PipelineError> {
        let started = Instant::now();
        self.frames_read += 1;
        let index = self.frames_read;

        let (sweep, colorized) = match self.previous.as_ref() {
            None => {
                let info = self.source.info();
                if info.width != 0 && (info.width, info.height) != frame.dimensions() {
                    return Err(FrameError::DimensionMismatch {
                        expected: (info.width, info.height),
                        actual: frame.dimensions(),
                    }
                    .into());
                }
                (SweepResult::empty(), frame.to_grayscale_rgb())
            }
            Some(previous) => {
                let diff = DiffFrame::compute(previous, &frame)?;
                let sweep = self.analyzer.analyze(&diff);
                let colorized = self.colorizer.colorize(frame.to_grayscale_rgb(), &diff)?;
                (sweep, colorized)
            }
        };

        let severity = severity(&sweep);
        let out = self.compositor.compose(&colorized, &sweep, severity)?;
        self.sink.write_frame(&out)?;
        self.frames_written += 1;

        let is_static = self.freeze.observe(index, &sweep);
        if !sweep.is_empty() {
            self.statistics.record(index, severity);
        }
        tracing::trace!(frame = index, severity, ?is_static, "Frame emitted");

        let report = FrameReport {
            index,
            sweep: &sweep,
            severity,
            is_static,
            elapsed: started.elapsed(),
        };
        for observer in &mut self.observers {
            observer.on_frame(&report);
        }

        self.previous = Some(frame);
        self.state = DriverState::Steady;
        Ok(())
    }

    /// Clean end: release the held frame and finalize the sink.
    fn shutdown(&mut self) -> Result<(), PipelineError> {
        self.state = DriverState::StreamExhausted;
        self.previous = None;
        self.sink.finish()?;
        Ok(())
    }

    /// Failure path: nothing more is written, but what was written is finalized.
    fn abort(&mut self) {
        self.state = DriverState::StreamExhausted;
        self.previous = None;
        if let Err(e) = self.sink.finish() {
            tracing::warn!(error = %e, "Failed to finalize output after error");
        }
    }
}
