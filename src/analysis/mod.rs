//! Motion analysis.
//!
//! Turns a pair of consecutive frames into numbers: the per-channel
//! difference, the threshold sweep over it, and the severity score
//! derived from the sweep's baseline error. Freeze detection and run
//! statistics consume those numbers without feeding back into them.

mod buckets;
mod diff;
mod freeze;
mod severity;
mod statistics;
mod sweep;

pub use buckets::{bucket_for, SeverityBucket, BUCKETS, PALETTE, THRESHOLD_STEP};
pub use diff::DiffFrame;
pub use freeze::{FreezeCriteria, FreezeMonitor, FrozenSegment};
pub use severity::{normalize_error, severity};
pub use statistics::RunStatistics;
pub use sweep::{floor_percent, BucketCount, SweepResult, ThresholdSweep};
