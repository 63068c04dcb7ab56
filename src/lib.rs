//! Frame-difference motion visualizer.
//!
//! Compares every video frame with its predecessor, buckets pixels by
//! how much they changed, and renders an annotated copy of the stream:
//! a header with per-bucket occupancy, the frame recolored by bucket,
//! and a footer bar showing an overall severity score. Long runs of
//! near-static frames are reported as frozen segments.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! video → analysis → render → video
//!            ↓
//!        pipeline observers (freeze detection, metrics)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fdiff::{
//!     pipeline::StreamingDriver,
//!     video::{FfmpegSink, FfmpegSource, FrameSource},
//!     FileConfig,
//! };
//!
//! let config = FileConfig::default();
//! let source = FfmpegSource::open("input.mp4").unwrap();
//! let info = source.info().clone();
//! let sink = FfmpegSink::open(
//!     "input.mp4.fdiff.mp4",
//!     info.width,
//!     config.layout.output_height(info.height),
//!     &info.encoder_rate(),
//!     &config.output.codec,
//! )
//! .unwrap();
//!
//! let mut driver = StreamingDriver::from_config(source, sink, &config).unwrap();
//! let summary = driver.run().unwrap();
//! println!("{} frozen segments", summary.frozen_segments.len());
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod video;

// Re-export commonly used types at crate root
pub use analysis::{DiffFrame, FreezeCriteria, FrozenSegment, SweepResult, ThresholdSweep};
pub use config::{ConfigError, FileConfig, OutputConfig};
pub use pipeline::{PipelineError, RunSummary, StreamingDriver};
pub use render::{BucketColorizer, FrameCompositor, Layout};
pub use video::{Frame, FrameSink, FrameSource, VideoError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
