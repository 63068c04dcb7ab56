//! Video input and output.
//!
//! This module is the boundary with the outside world: it yields
//! equal-sized RGB frames from a container or image sequence and
//! accepts annotated frames for encoding. The analysis pipeline never
//! touches codecs or files directly.

mod ffmpeg;
mod frame;
mod sequence;
mod source;

pub use ffmpeg::{FfmpegSink, FfmpegSource};
pub use frame::{luma, Frame, FrameError, RegionMut, CHANNELS};
pub use sequence::{ImageSequenceSink, ImageSequenceSource};
pub use source::{FrameSink, FrameSource, MemorySink, MemorySource, StreamInfo, VideoError};
