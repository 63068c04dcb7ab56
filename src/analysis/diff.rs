//! Per-channel absolute difference between consecutive frames.

use crate::video::{Frame, FrameError, CHANNELS};

/// Absolute per-channel difference of two equal-sized frames.
#[derive(Clone, PartialEq, Eq)]
pub struct DiffFrame {
    values: Vec<u8>,
    width: u32,
    height: u32,
}

impl DiffFrame {
    /// Computes `|a - b|` for every channel of every pixel.
    ///
    /// Fails with `DimensionMismatch` if the frames differ in size.
    pub fn compute(a: &Frame, b: &Frame) -> Result<Self, FrameError> {
        a.ensure_same_size(b)?;
        let values = a
            .pixels()
            .iter()
            .zip(b.pixels())
            .map(|(&x, &y)| x.abs_diff(y))
            .collect();
        Ok(Self {
            values,
            width: a.width(),
            height: a.height(),
        })
    }

    /// Raw difference values, three per pixel.
    #[inline]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Iterates pixels as `[r, g, b]` difference triples.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.values.chunks_exact(CHANNELS)
    }

    /// Largest channel difference of pixel `index` (row-major).
    ///
    /// A pixel exceeds threshold `t` exactly when this value is `> t`.
    #[inline]
    pub fn max_channel(&self, index: usize) -> u8 {
        let i = index * CHANNELS;
        self.values[i..i + CHANNELS]
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for DiffFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_frames_zero_difference() {
        let a = Frame::filled(8, 8, [100, 50, 3], 1);
        let diff = DiffFrame::compute(&a, &a.clone()).unwrap();

        assert!(diff.values().iter().all(|&v| v == 0));
        assert_eq!(diff.pixel_count(), 64);
    }

    #[test]
    fn test_difference_is_symmetric() {
        let a = Frame::filled(2, 2, [10, 200, 0], 1);
        let b = Frame::filled(2, 2, [30, 100, 255], 2);

        let ab = DiffFrame::compute(&a, &b).unwrap();
        let ba = DiffFrame::compute(&b, &a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.pixels().next().unwrap(), &[20, 100, 255]);
        assert_eq!(ab.max_channel(3), 255);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Frame::filled(8, 8, [0, 0, 0], 1);
        let b = Frame::filled(8, 9, [0, 0, 0], 2);

        assert_eq!(
            DiffFrame::compute(&a, &b),
            Err(FrameError::DimensionMismatch {
                expected: (8, 8),
                actual: (8, 9),
            })
        );
    }

    proptest! {
        #[test]
        fn prop_diff_is_elementwise_abs(
            (w, h, a, b) in (1u32..6, 1u32..6).prop_flat_map(|(w, h)| {
                let len = (w * h * 3) as usize;
                (
                    Just(w),
                    Just(h),
                    prop::collection::vec(any::<u8>(), len),
                    prop::collection::vec(any::<u8>(), len),
                )
            })
        ) {
            let fa = Frame::new(a.clone(), w, h, 1).unwrap();
            let fb = Frame::new(b.clone(), w, h, 2).unwrap();
            let diff = DiffFrame::compute(&fa, &fb).unwrap();

            for (i, &v) in diff.values().iter().enumerate() {
                prop_assert_eq!(v as i16, (a[i] as i16 - b[i] as i16).abs());
            }
        }
    }
}
