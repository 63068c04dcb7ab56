//! The fixed severity bucket table and display palette.

/// Display colors (RGB), indexed by `threshold / 10`.
pub const PALETTE: [[u8; 3]; 5] = [
    [229, 31, 31],
    [242, 161, 52],
    [247, 227, 211],
    [187, 219, 68],
    [68, 206, 27],
];

/// Distance between consecutive thresholds.
pub const THRESHOLD_STEP: u8 = 5;

/// One severity level: pixels whose largest channel difference is
/// strictly greater than `threshold` belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityBucket {
    pub threshold: u8,
    pub color: [u8; 3],
}

impl SeverityBucket {
    const fn new(threshold: u8) -> Self {
        Self {
            threshold,
            color: PALETTE[(threshold / 10) as usize],
        }
    }

    /// Palette index, which doubles as the header label.
    #[inline]
    pub const fn color_index(&self) -> u8 {
        self.threshold / 10
    }

    /// True if a pixel with this largest channel difference qualifies.
    #[inline]
    pub const fn exceeded_by(&self, max_channel: u8) -> bool {
        max_channel > self.threshold
    }
}

/// All buckets in ascending threshold order.
///
/// Counting, colorizing and header text all iterate this table front to
/// back; colorizing relies on the order so the highest bucket paints last.
pub const BUCKETS: [SeverityBucket; 10] = [
    SeverityBucket::new(0),
    SeverityBucket::new(5),
    SeverityBucket::new(10),
    SeverityBucket::new(15),
    SeverityBucket::new(20),
    SeverityBucket::new(25),
    SeverityBucket::new(30),
    SeverityBucket::new(35),
    SeverityBucket::new(40),
    SeverityBucket::new(45),
];

/// Looks up the bucket with exactly this threshold.
pub fn bucket_for(threshold: u8) -> Option<&'static SeverityBucket> {
    BUCKETS.iter().find(|b| b.threshold == threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ascending_by_step() {
        for pair in BUCKETS.windows(2) {
            assert_eq!(pair[1].threshold - pair[0].threshold, THRESHOLD_STEP);
        }
        assert_eq!(BUCKETS[0].threshold, 0);
    }

    #[test]
    fn test_pairs_share_a_color() {
        assert_eq!(BUCKETS[0].color, BUCKETS[1].color);
        assert_eq!(BUCKETS[2].color_index(), 1);
        assert_eq!(BUCKETS[3].color, PALETTE[1]);
        assert_eq!(BUCKETS[9].color_index(), 4);
        assert_ne!(BUCKETS[1].color, BUCKETS[2].color);
    }

    #[test]
    fn test_exceeded_is_strict() {
        let b = bucket_for(25).unwrap();
        assert!(!b.exceeded_by(25));
        assert!(b.exceeded_by(26));
        assert!(bucket_for(7).is_none());
    }
}
