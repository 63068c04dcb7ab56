//! Assembly of the annotated output frame.

use super::annotate::{AnnotationRenderer, BLACK};
use super::layout::Layout;
use crate::analysis::SweepResult;
use crate::video::{Frame, FrameError};

/// Stacks header strip, colorized frame and footer strip.
pub struct FrameCompositor {
    layout: Layout,
    renderer: AnnotationRenderer,
}

impl FrameCompositor {
    pub fn new(layout: Layout) -> Self {
        let renderer = AnnotationRenderer::new(&layout);
        Self { layout, renderer }
    }

    /// Output dimensions for a source of the given size.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width, self.layout.output_height(height))
    }

    /// Builds one output frame; the result keeps the source sequence number.
    pub fn compose(
        &self,
        colorized: &Frame,
        sweep: &SweepResult,
        severity: f64,
    ) -> Result<Frame, FrameError> {
        let (width, height) = colorized.dimensions();
        let header = self.layout.header_height;
        let (_, total) = self.output_dimensions(width, height);

        let mut out = Frame::filled(width, total, BLACK, colorized.sequence());
        out.blit_rows(colorized, header)?;

        self.renderer
            .draw_header(&mut out.rows_mut(0, header), sweep, severity);
        if self.layout.footer_height > 0 {
            self.renderer
                .draw_footer(&mut out.rows_mut(header + height, total), severity);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_geometry() {
        let compositor = FrameCompositor::new(Layout::default());
        let frame = Frame::filled(48, 10, [17, 17, 17], 4);
        let out = compositor.compose(&frame, &SweepResult::empty(), 0.0).unwrap();

        assert_eq!(out.dimensions(), (48, 64 + 10 + 24));
        assert_eq!(out.sequence(), 4);
        for y in 64..74 {
            for x in 0..48 {
                assert_eq!(out.pixel(x, y), Some([17, 17, 17]));
            }
        }
    }

    #[test]
    fn test_without_footer() {
        let layout = Layout {
            footer_height: 0,
            ..Layout::default()
        };
        let compositor = FrameCompositor::new(layout);
        let frame = Frame::filled(32, 6, [1, 2, 3], 1);
        let out = compositor.compose(&frame, &SweepResult::empty(), 0.5).unwrap();

        assert_eq!(out.dimensions(), (32, 70));
        assert_eq!(out.pixel(31, 69), Some([1, 2, 3]));
    }
}
