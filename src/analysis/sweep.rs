//! Multi-threshold sweep over a difference frame.

use super::buckets::{SeverityBucket, BUCKETS};
use super::diff::DiffFrame;

/// Pixel count for one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketCount {
    pub threshold: u8,
    pub count: u64,
}

/// Outcome of sweeping every threshold over one difference frame.
///
/// Counts overlap: a pixel is counted once for every threshold it
/// exceeds, so they are cumulative rather than a partition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepResult {
    buckets: Vec<BucketCount>,
    baseline_error_sum: f64,
    total_pixels: u64,
}

impl SweepResult {
    /// The "no data" result used when there is no previous frame.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Per-threshold counts in ascending threshold order.
    #[inline]
    pub fn buckets(&self) -> &[BucketCount] {
        &self.buckets
    }

    /// Sum of squared channel differences over pixels exceeding threshold 0.
    #[inline]
    pub fn baseline_error_sum(&self) -> f64 {
        self.baseline_error_sum
    }

    /// Number of pixels analyzed, 0 for the empty result.
    #[inline]
    pub fn total_pixels(&self) -> u64 {
        self.total_pixels
    }

    /// True when there was nothing to analyze.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_pixels == 0
    }

    /// Count recorded for `threshold`, if it is in the table.
    pub fn count_at(&self, threshold: u8) -> Option<u64> {
        self.buckets
            .iter()
            .find(|b| b.threshold == threshold)
            .map(|b| b.count)
    }

    /// Floor percentage of pixels exceeding `threshold`; 0 without data.
    pub fn percent_at(&self, threshold: u8) -> u64 {
        self.count_at(threshold)
            .map(|count| floor_percent(count, self.total_pixels))
            .unwrap_or(0)
    }
}

/// `floor(count / total * 100)`, 0 when `total` is 0.
#[inline]
pub fn floor_percent(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    count.saturating_mul(100) / total
}

/// Classifies pixels against the bucket table.
pub struct ThresholdSweep {
    buckets: &'static [SeverityBucket],
}

impl ThresholdSweep {
    pub fn new() -> Self {
        Self { buckets: &BUCKETS }
    }

    /// Runs one counting pass per threshold, smallest first.
    ///
    /// The baseline error is accumulated on the threshold-0 pass only.
    pub fn analyze(&self, diff: &DiffFrame) -> SweepResult {
        let mut baseline_error_sum = 0.0f64;
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| {
                let mut count = 0u64;
                for px in diff.pixels() {
                    let max = px[0].max(px[1]).max(px[2]);
                    if !bucket.exceeded_by(max) {
                        continue;
                    }
                    count += 1;
                    if bucket.threshold == 0 {
                        let squares: u32 = px.iter().map(|&c| (c as u32) * (c as u32)).sum();
                        baseline_error_sum += squares as f64;
                    }
                }
                BucketCount {
                    threshold: bucket.threshold,
                    count,
                }
            })
            .collect();

        let result = SweepResult {
            buckets,
            baseline_error_sum,
            total_pixels: diff.pixel_count() as u64,
        };
        tracing::trace!(
            total = result.total_pixels,
            baseline = result.baseline_error_sum,
            "Threshold sweep complete"
        );
        result
    }
}

impl Default for ThresholdSweep {
    fn default() -> Self {
        Self::new()
    }
}
