//! Recoloring of the working frame by motion bucket.

use crate::analysis::{DiffFrame, SeverityBucket, BUCKETS};
use crate::video::{Frame, FrameError};

/// Paints moving pixels with their bucket color.
pub struct BucketColorizer {
    buckets: &'static [SeverityBucket],
}

impl BucketColorizer {
    pub fn new() -> Self {
        Self { buckets: &BUCKETS }
    }

    /// Repaints `working` in place and hands it back.
    ///
    /// Buckets are applied smallest threshold first and each one
    /// overwrites unconditionally, so a pixel ends up with the color of
    /// the highest threshold it exceeds. Pixels below every threshold
    /// keep their original value.
    pub fn colorize(&self, mut working: Frame, diff: &DiffFrame) -> Result<Frame, FrameError> {
        if working.dimensions() != diff.dimensions() {
            return Err(FrameError::DimensionMismatch {
                expected: diff.dimensions(),
                actual: working.dimensions(),
            });
        }

        for bucket in self.buckets {
            for index in 0..diff.pixel_count() {
                if bucket.exceeded_by(diff.max_channel(index)) {
                    working.pixel_mut(index).copy_from_slice(&bucket.color);
                }
            }
        }
        Ok(working)
    }
}

impl Default for BucketColorizer {
    fn default() -> Self {
        Self::new()
    }
}
