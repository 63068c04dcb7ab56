//! Visual output: bucket recoloring and frame annotation.
//!
//! Rendering consumes analysis results and never feeds back into them.
//! All drawing goes through `RegionMut` strips so each renderer is
//! confined to the rows it owns.

mod annotate;
mod colorize;
mod compose;
mod font;
mod layout;

pub use annotate::{bar_fill_width, header_text, severity_text, AnnotationRenderer, BLACK, WHITE};
pub use colorize::BucketColorizer;
pub use compose::FrameCompositor;
pub use font::{draw_text, text_width};
pub use layout::{Layout, LayoutError, TEXT_MARGIN};
