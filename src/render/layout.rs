//! Output frame geometry.

use super::font::GLYPH_HEIGHT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Left offset of header text and gap below each text line.
pub const TEXT_MARGIN: u32 = 3;

/// Layout validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("font scale must be at least 1")]
    InvalidFontScale,
    #[error("header height {height} cannot hold two text lines (needs {required})")]
    HeaderTooShort { height: u32, required: u32 },
    #[error("footer height {height} cannot hold a bar with margin {margin} (needs 0 or {required})")]
    FooterTooShort {
        height: u32,
        margin: u32,
        required: u32,
    },
}

/// Strip sizes around the colorized frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Height of the text strip above the frame.
    pub header_height: u32,
    /// Height of the severity bar strip below the frame; 0 disables it.
    pub footer_height: u32,
    /// Gap between the footer strip edges and the bar outline.
    pub footer_margin: u32,
    /// Integer scale of the 3x5 bitmap font.
    pub font_scale: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            header_height: 64,
            footer_height: 24,
            footer_margin: 4,
            font_scale: 2,
        }
    }
}

impl Layout {
    /// Output height for a source of `frame_height` rows.
    #[inline]
    pub fn output_height(&self, frame_height: u32) -> u32 {
        self.header_height + frame_height + self.footer_height
    }

    /// Rendered glyph height in pixels.
    #[inline]
    pub fn glyph_height(&self) -> u32 {
        GLYPH_HEIGHT * self.font_scale
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.font_scale == 0 {
            return Err(LayoutError::InvalidFontScale);
        }
        let required = 2 * (self.glyph_height() + TEXT_MARGIN);
        if self.header_height < required {
            return Err(LayoutError::HeaderTooShort {
                height: self.header_height,
                required,
            });
        }
        let bar_min = 2 * self.footer_margin + 3;
        if self.footer_height != 0 && self.footer_height < bar_min {
            return Err(LayoutError::FooterTooShort {
                height: self.footer_height,
                margin: self.footer_margin,
                required: bar_min,
            });
        }
        Ok(())
    }
}
