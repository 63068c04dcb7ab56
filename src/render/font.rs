//! Built-in 3x5 bitmap font for annotation text.

use crate::video::RegionMut;

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: u32 = 3;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: u32 = 5;
/// Horizontal distance between glyph origins in font pixels.
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

const fn glyph_bits(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b010, 0b000, 0b010],
    }
}

/// Pixel width of `text` at `scale`, including trailing spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale
}

/// Draws `text` left-aligned at `x` with the glyph bottoms resting on row `bottom - 1`.
///
/// Glyphs are clipped to the region; nothing wraps.
pub fn draw_text(
    region: &mut RegionMut<'_>,
    x: i64,
    bottom: i64,
    text: &str,
    scale: u32,
    color: [u8; 3],
) {
    let scale = scale.max(1) as i64;
    let top = bottom - GLYPH_HEIGHT as i64 * scale;
    let mut cursor = x;

    for ch in text.chars() {
        if cursor >= region.width() as i64 {
            break;
        }
        let glyph = glyph_bits(ch.to_ascii_uppercase());
        for (row, pattern) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = cursor + col as i64 * scale;
                let py = top + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        region.put_pixel(px + dx, py + dy, color);
                    }
                }
            }
        }
        cursor += GLYPH_ADVANCE as i64 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::Frame;

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("[0_5%]", 1), 24);
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("AB", 3), 24);
    }

    #[test]
    fn test_glyph_lands_above_bottom() {
        let mut frame = Frame::filled(8, 8, [0, 0, 0], 0);
        {
            let mut region = frame.rows_mut(0, 8);
            draw_text(&mut region, 0, 6, "_", 1, WHITE);
        }
        // The underscore's only row is the glyph's bottom row.
        for x in 0..3 {
            assert_eq!(frame.pixel(x, 5), Some(WHITE));
            assert_eq!(frame.pixel(x, 4), Some([0, 0, 0]));
        }
        assert_eq!(frame.pixel(3, 5), Some([0, 0, 0]));
    }

    #[test]
    fn test_scaled_text_is_clipped() {
        let mut frame = Frame::filled(6, 12, [0, 0, 0], 0);
        {
            let mut region = frame.rows_mut(0, 12);
            draw_text(&mut region, 2, 10, "88888", 2, WHITE);
        }
        assert_eq!(frame.pixel(2, 0), Some(WHITE));
        assert_eq!(frame.pixel(2, 10), Some([0, 0, 0]));
        assert_eq!(frame.pixel(2, 9), Some(WHITE));
        assert_eq!(frame.pixel(5, 9), Some(WHITE));
        assert_eq!(frame.pixel(0, 9), Some([0, 0, 0]));
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        let mut lower = Frame::filled(4, 6, [0, 0, 0], 0);
        let mut upper = lower.clone();
        draw_text(&mut lower.rows_mut(0, 6), 0, 5, "s", 1, WHITE);
        draw_text(&mut upper.rows_mut(0, 6), 0, 5, "S", 1, WHITE);
        assert_eq!(lower, upper);
    }
}
