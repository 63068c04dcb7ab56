//! Prometheus metrics for a run.
//!
//! The registry is a `FrameObserver`: attach it to the driver and it
//! tracks frame counts, severity and bucket occupancy. The text
//! encoding can be written to a file once the run ends.
//!
//! # Metrics Exposed
//!
//! - `fdiff_frames_total` - Annotated frames written
//! - `fdiff_static_frames_total` - Frames judged near-static
//! - `fdiff_frozen_segments` - Frozen segments in the finished run
//! - `fdiff_pipeline_frames_per_second` - Pipeline throughput
//! - `fdiff_severity` - Severity of the latest frame
//! - `fdiff_peak_severity` - Largest severity seen
//! - `fdiff_bucket_occupancy_percent{threshold}` - Per-threshold occupancy of the latest frame

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
