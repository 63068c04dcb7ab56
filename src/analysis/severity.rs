//! Conversion of the baseline error into a single severity score.
//!
//! The score is `sqrt(|sum|) / 255` with no division by the pixel
//! count, so it grows with frame area and saturates quickly once change
//! is widespread. It is not a mean squared error and is not clamped;
//! the footer bar clips it to 1.0 when drawing.

use super::sweep::SweepResult;

/// Maximum 8-bit channel value.
const CHANNEL_MAX: f64 = 255.0;

/// Normalizes a raw sum of squared differences.
#[inline]
pub fn normalize_error(baseline_error_sum: f64) -> f64 {
    baseline_error_sum.abs().sqrt() / CHANNEL_MAX
}

/// Severity score of a sweep; 0 for the empty result.
#[inline]
pub fn severity(sweep: &SweepResult) -> f64 {
    normalize_error(sweep.baseline_error_sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiffFrame, ThresholdSweep};
    use crate::video::Frame;

    #[test]
    fn test_zero_error_zero_severity() {
        assert_eq!(normalize_error(0.0), 0.0);
        assert_eq!(severity(&SweepResult::empty()), 0.0);
    }

    #[test]
    fn test_negative_sum_uses_magnitude() {
        assert_eq!(normalize_error(-65025.0), 1.0);
    }

    #[test]
    fn test_saturated_frame_exceeds_one() {
        let a = Frame::filled(4, 3, [0, 0, 0], 1);
        let b = Frame::filled(4, 3, [255, 255, 255], 2);
        let sweep = ThresholdSweep::new().analyze(&DiffFrame::compute(&a, &b).unwrap());

        let expected = (12.0f64 * 3.0).sqrt();
        assert!((severity(&sweep) - expected).abs() < 1e-9);
        assert!(severity(&sweep) > 1.0);
    }
}
