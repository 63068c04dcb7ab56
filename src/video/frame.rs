//! Frame type representing a decoded RGB24 image.

use thiserror::Error;

/// Bytes per pixel for every frame in the pipeline (RGB24).
pub const CHANNELS: usize = 3;

/// Errors raised when frames are combined or constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("pixel buffer holds {actual} bytes, {width}x{height} RGB needs {expected}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A single video frame.
///
/// Pixels are stored row-major, three bytes (R, G, B) per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw RGB24 pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Monotonic sequence number assigned by the source.
    sequence: u64,
}

impl Frame {
    /// Creates a frame from an existing RGB24 buffer.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Result<Self, FrameError> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(FrameError::InvalidBuffer {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            sequence,
        })
    }

    /// Creates a frame where every pixel has the given color.
    pub fn filled(width: u32, height: u32, color: [u8; 3], sequence: u64) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height))
            .collect();
        Self {
            pixels,
            width,
            height,
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == byte_len(self.width, self.height)
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Overwrites the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&color);
    }

    /// Mutable access to pixel `index` (row-major), used by whole-frame transforms.
    #[inline]
    pub(crate) fn pixel_mut(&mut self, index: usize) -> &mut [u8] {
        let i = index * CHANNELS;
        &mut self.pixels[i..i + CHANNELS]
    }

    /// Converts to BT.601 luma and expands back to three equal channels.
    pub fn to_grayscale_rgb(&self) -> Frame {
        let pixels = self
            .pixels
            .chunks_exact(CHANNELS)
            .flat_map(|px| {
                let luma = luma(px[0], px[1], px[2]);
                [luma, luma, luma]
            })
            .collect();
        Frame {
            pixels,
            width: self.width,
            height: self.height,
            sequence: self.sequence,
        }
    }

    /// Fails with `DimensionMismatch` unless `other` has the same size.
    pub fn ensure_same_size(&self, other: &Frame) -> Result<(), FrameError> {
        if self.dimensions() != other.dimensions() {
            return Err(FrameError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Copies `src` into this frame with its top edge at row `y`.
    pub fn blit_rows(&mut self, src: &Frame, y: u32) -> Result<(), FrameError> {
        if src.width != self.width || y.saturating_add(src.height) > self.height {
            return Err(FrameError::DimensionMismatch {
                expected: (self.width, self.height.saturating_sub(y)),
                actual: src.dimensions(),
            });
        }
        let start = self.offset(0, y);
        self.pixels[start..start + src.pixels.len()].copy_from_slice(&src.pixels);
        Ok(())
    }

    /// Borrows rows `y0..y1` as an exclusive drawing region.
    ///
    /// The range is clamped to the frame height.
    pub fn rows_mut(&mut self, y0: u32, y1: u32) -> RegionMut<'_> {
        let y1 = y1.min(self.height);
        let y0 = y0.min(y1);
        let start = self.offset(0, y0);
        let end = self.offset(0, y1);
        RegionMut {
            pixels: &mut self.pixels[start..end],
            width: self.width,
            height: y1 - y0,
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

/// A horizontal strip of a frame, borrowed for drawing.
///
/// Coordinates are local to the strip; writes outside it are dropped.
pub struct RegionMut<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl RegionMut<'_> {
    /// Region width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Region height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paints the whole region with one color.
    pub fn fill(&mut self, color: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&color);
        }
    }

    /// Sets one pixel, ignoring coordinates outside the region.
    #[inline]
    pub fn put_pixel(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        self.pixels[i..i + CHANNELS].copy_from_slice(&color);
    }

    /// Fills the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the region.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
        let xs = x0.max(0)..x1.min(self.width as i64);
        for y in y0.max(0)..y1.min(self.height as i64) {
            for x in xs.clone() {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Draws a 1 px border on the inclusive corners `(x0, y0)` and `(x1, y1)`.
    pub fn outline_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
        for x in x0..=x1 {
            self.put_pixel(x, y0, color);
            self.put_pixel(x, y1, color);
        }
        for y in y0..=y1 {
            self.put_pixel(x0, y, color);
            self.put_pixel(x1, y, color);
        }
    }
}

/// BT.601 luma with integer rounding.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * CHANNELS
}
