//! Streaming orchestration.
//!
//! The driver owns the only cross-frame state (the previous raw frame)
//! and runs each frame pair through:
//!
//! ```text
//! frame pair → diff → sweep → (colorized frame, severity) → strips → output frame
//! ```

mod driver;
mod observer;

pub use driver::{DriverState, StreamingDriver};
pub use observer::{FrameObserver, FrameReport, ThroughputLogger};

use crate::analysis::{FrozenSegment, RunStatistics};
use crate::config::ConfigError;
use crate::video::{FrameError, VideoError};
use thiserror::Error;

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of a completed (or stopped) run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Annotated frames handed to the sink.
    pub frames_written: u64,
    /// True if the run ended because a stop was requested.
    pub interrupted: bool,
    /// Runs of near-static frames long enough to count as frozen.
    pub frozen_segments: Vec<FrozenSegment>,
    /// Frames judged static, in or out of a segment.
    pub static_frames: u64,
    /// Severity aggregates.
    pub statistics: RunStatistics,
}
