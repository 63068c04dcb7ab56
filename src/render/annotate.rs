//! Header text and footer severity bar.

use super::font::draw_text;
use super::layout::{Layout, TEXT_MARGIN};
use crate::analysis::{floor_percent, SweepResult};
use crate::video::RegionMut;

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Builds the header token line: `[<label>_<percent>%]` per threshold.
///
/// Empty when the sweep carries no data.
pub fn header_text(sweep: &SweepResult) -> String {
    if sweep.is_empty() {
        return String::new();
    }
    sweep
        .buckets()
        .iter()
        .map(|b| {
            format!(
                "[{}_{}%]",
                b.threshold / 10,
                floor_percent(b.count, sweep.total_pixels())
            )
        })
        .collect()
}

/// The unclamped score line.
pub fn severity_text(severity: f64) -> String {
    format!("SEVERITY:{severity:.6}")
}

/// Width of the filled part of a bar with `interior` pixels.
pub fn bar_fill_width(interior: u32, severity: f64) -> u32 {
    let fraction = severity.clamp(0.0, 1.0);
    if fraction.is_nan() {
        return 0;
    }
    ((interior as f64) * fraction).floor() as u32
}

/// Draws annotation strips. Never touches pixels outside the region it is given.
pub struct AnnotationRenderer {
    font_scale: u32,
    footer_margin: u32,
}

impl AnnotationRenderer {
    pub fn new(layout: &Layout) -> Self {
        Self {
            font_scale: layout.font_scale.max(1),
            footer_margin: layout.footer_margin,
        }
    }

    /// Clears the strip and writes the token line and the score line.
    pub fn draw_header(&self, strip: &mut RegionMut<'_>, sweep: &SweepResult, severity: f64) {
        strip.fill(BLACK);
        let h = strip.height() as i64;
        let x = TEXT_MARGIN as i64;
        let gap = TEXT_MARGIN as i64;

        draw_text(strip, x, h - gap, &header_text(sweep), self.font_scale, WHITE);
        draw_text(
            strip,
            x,
            h / 2 - gap,
            &severity_text(severity),
            self.font_scale,
            WHITE,
        );
    }

    /// Clears the strip and draws the outlined bar, filled by `min(severity, 1)`.
    ///
    /// Returns the filled width in pixels.
    pub fn draw_footer(&self, strip: &mut RegionMut<'_>, severity: f64) -> u32 {
        strip.fill(BLACK);
        let (w, h) = (strip.width() as i64, strip.height() as i64);
        let m = self.footer_margin as i64;

        let (x0, y0, x1, y1) = (m, m, w - 1 - m, h - 1 - m);
        if x1 - x0 < 2 || y1 - y0 < 2 {
            return 0;
        }

        strip.outline_rect(x0, y0, x1, y1, WHITE);

        let interior = (x1 - x0 - 1) as u32;
        let fill = bar_fill_width(interior, severity);
        strip.fill_rect(x0 + 1, y0 + 1, x0 + 1 + fill as i64, y1, WHITE);
        fill
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiffFrame, ThresholdSweep};
    use crate::video::Frame;
    use proptest::prelude::*;

    fn sweep_for(delta: [u8; 3]) -> SweepResult {
        let a = Frame::filled(4, 4, [0, 0, 0], 1);
        let mut b = a.clone();
        b.set_pixel(0, 0, delta);
        ThresholdSweep::new().analyze(&DiffFrame::compute(&a, &b).unwrap())
    }

    #[test]
    fn test_header_text_order_and_percent() {
        let text = header_text(&sweep_for([12, 0, 0]));
        assert_eq!(
            text,
            "[0_6%][0_6%][1_6%][1_0%][2_0%][2_0%][3_0%][3_0%][4_0%][4_0%]"
        );
    }

    #[test]
    fn test_header_text_blank_without_data() {
        assert_eq!(header_text(&SweepResult::empty()), "");
    }

    #[test]
    fn test_severity_text_is_unclamped() {
        assert_eq!(severity_text(0.0), "SEVERITY:0.000000");
        assert_eq!(severity_text(6.5), "SEVERITY:6.500000");
    }

    #[test]
    fn test_bar_fill_width() {
        assert_eq!(bar_fill_width(100, 0.0), 0);
        assert_eq!(bar_fill_width(100, 0.259), 25);
        assert_eq!(bar_fill_width(100, 7.0), 100);
        assert_eq!(bar_fill_width(100, f64::NAN), 0);
    }

    #[test]
    fn test_footer_zero_severity_draws_outline_only() {
        let renderer = AnnotationRenderer::new(&Layout::default());
        let mut frame = Frame::filled(40, 24, [9, 9, 9], 0);
        let filled = renderer.draw_footer(&mut frame.rows_mut(0, 24), 0.0);

        assert_eq!(filled, 0);
        assert_eq!(frame.pixel(0, 0), Some(BLACK));
        assert_eq!(frame.pixel(4, 4), Some(WHITE));
        assert_eq!(frame.pixel(35, 19), Some(WHITE));
        assert_eq!(frame.pixel(5, 10), Some(BLACK));
    }

    #[test]
    fn test_footer_saturated_fills_interior() {
        let renderer = AnnotationRenderer::new(&Layout::default());
        let mut frame = Frame::filled(40, 24, [9, 9, 9], 0);
        let filled = renderer.draw_footer(&mut frame.rows_mut(0, 24), 3.0);

        // Outline spans x 4..=35, interior x 5..=34.
        assert_eq!(filled, 30);
        assert_eq!(frame.pixel(34, 10), Some(WHITE));
        assert_eq!(frame.pixel(36, 10), Some(BLACK));
    }

    #[test]
    fn test_header_clears_strip() {
        let renderer = AnnotationRenderer::new(&Layout::default());
        let mut frame = Frame::filled(64, 64, [9, 9, 9], 0);
        renderer.draw_header(&mut frame.rows_mut(0, 64), &SweepResult::empty(), 0.0);

        assert!(frame.pixels().iter().all(|&v| v == 0 || v == 255));
        // Token line is blank, so the lower text band stays black.
        for y in 51..61 {
            for x in 0..64 {
                assert_eq!(frame.pixel(x, y), Some(BLACK));
            }
        }
        assert!(frame.pixels().contains(&255));
    }

    proptest! {
        #[test]
        fn prop_header_percents_in_range(delta in any::<[u8; 3]>()) {
            let text = header_text(&sweep_for(delta));
            let tokens: Vec<&str> = text
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split("][")
                .collect();
            prop_assert_eq!(tokens.len(), 10);
            for (i, token) in tokens.iter().enumerate() {
                let (label, percent) = token.trim_end_matches('%').split_once('_').unwrap();
                prop_assert_eq!(label.parse::<usize>().unwrap(), i / 2);
                prop_assert!(percent.parse::<u64>().unwrap() <= 100);
            }
        }
    }
}
