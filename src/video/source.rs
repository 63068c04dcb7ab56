//! Frame source and sink abstractions.
//!
//! The pipeline only ever talks to these traits, so decoding backends
//! (ffmpeg, PNG sequences, in-memory buffers for tests) are swappable.

use super::Frame;
use std::collections::VecDeque;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the video I/O layer.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("cannot open input {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("cannot write output {path}: {reason}")]
    SinkUnwritable { path: PathBuf, reason: String },
    #[error("frame read failed: {0}")]
    TransportRead(String),
    #[error("frame is {actual:?}, stream expects {expected:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Stream properties reported by a source when it is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub frame_rate: f64,
    /// Exact rate as reported by the container, e.g. `30000/1001`.
    pub frame_rate_ratio: Option<String>,
    /// Total frame count, 0 when unknown.
    pub frame_count: u64,
}

impl StreamInfo {
    /// Rate argument for an encoder: the exact ratio when known.
    pub fn encoder_rate(&self) -> String {
        match &self.frame_rate_ratio {
            Some(ratio) => ratio.clone(),
            None => format!("{}", self.frame_rate),
        }
    }
}

/// A sequential producer of equal-sized frames.
pub trait FrameSource {
    /// Returns the stream properties.
    fn info(&self) -> &StreamInfo;

    /// Reads the next frame. `Ok(None)` marks end of stream.
    fn read_next(&mut self) -> Result<Option<Frame>, VideoError>;
}

/// A sequential consumer of equal-sized frames.
pub trait FrameSink {
    /// Appends one frame to the output.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError>;

    /// Flushes and closes the output. Further writes are invalid.
    fn finish(&mut self) -> Result<(), VideoError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn info(&self) -> &StreamInfo {
        (**self).info()
    }

    fn read_next(&mut self) -> Result<Option<Frame>, VideoError> {
        (**self).read_next()
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        (**self).finish()
    }
}

/// In-memory source for testing that replays a fixed list of frames.
///
/// An `Err` entry is surfaced as a transport failure when reached.
#[derive(Debug, Default)]
pub struct MemorySource {
    info: Option<StreamInfo>,
    frames: VecDeque<Result<Frame, String>>,
}

impl MemorySource {
    /// Creates a source from frames; dimensions are taken from the first one.
    pub fn new(frames: Vec<Frame>, frame_rate: f64) -> Self {
        let (width, height) = frames.first().map(Frame::dimensions).unwrap_or((0, 0));
        let frame_count = frames.len() as u64;
        Self {
            info: Some(StreamInfo {
                width,
                height,
                frame_rate,
                frame_rate_ratio: None,
                frame_count,
            }),
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    /// Queues a read failure after the frames already queued.
    pub fn push_failure(&mut self, reason: impl Into<String>) {
        self.frames.push_back(Err(reason.into()));
    }

    /// Number of entries not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

const EMPTY_INFO: StreamInfo = StreamInfo {
    width: 0,
    height: 0,
    frame_rate: 0.0,
    frame_rate_ratio: None,
    frame_count: 0,
};

impl FrameSource for MemorySource {
    fn info(&self) -> &StreamInfo {
        self.info.as_ref().unwrap_or(&EMPTY_INFO)
    }

    fn read_next(&mut self) -> Result<Option<Frame>, VideoError> {
        match self.frames.pop_front() {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(reason)) => Err(VideoError::TransportRead(reason)),
            None => Ok(None),
        }
    }
}

/// In-memory sink that keeps every written frame.
#[derive(Debug, Default)]
pub struct MemorySink {
    dimensions: Option<(u32, u32)>,
    frames: Vec<Frame>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects frames of any other size.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            dimensions: Some((width, height)),
            ..Self::default()
        }
    }

    /// Frames written so far.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// True once `finish` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::SinkUnwritable {
                path: PathBuf::from("<memory>"),
                reason: "sink already finished".into(),
            });
        }
        let expected = *self.dimensions.get_or_insert(frame.dimensions());
        if expected != frame.dimensions() {
            return Err(VideoError::FrameSize {
                expected,
                actual: frame.dimensions(),
            });
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        self.finished = true;
        tracing::debug!(frames = self.frames.len(), "MemorySink finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_lifecycle() {
        let frames = vec![
            Frame::filled(4, 2, [1, 2, 3], 1),
            Frame::filled(4, 2, [4, 5, 6], 2),
        ];
        let mut source = MemorySource::new(frames, 30.0);

        assert_eq!(source.info().width, 4);
        assert_eq!(source.info().frame_count, 2);
        assert_eq!(source.info().encoder_rate(), "30");

        assert_eq!(source.read_next().unwrap().unwrap().sequence(), 1);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.read_next().unwrap().unwrap().sequence(), 2);
        assert!(source.read_next().unwrap().is_none());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_encoder_rate_prefers_exact_ratio() {
        let info = StreamInfo {
            width: 1920,
            height: 1080,
            frame_rate: 30000.0 / 1001.0,
            frame_rate_ratio: Some("30000/1001".into()),
            frame_count: 0,
        };
        assert_eq!(info.encoder_rate(), "30000/1001");

        let rounded = StreamInfo {
            frame_rate_ratio: None,
            frame_rate: 12.5,
            ..info
        };
        assert_eq!(rounded.encoder_rate(), "12.5");
    }

    #[test]
    fn test_memory_source_failure() {
        let mut source = MemorySource::new(vec![Frame::filled(2, 2, [0, 0, 0], 1)], 25.0);
        source.push_failure("decoder crashed");

        assert!(source.read_next().unwrap().is_some());
        assert!(matches!(
            source.read_next(),
            Err(VideoError::TransportRead(reason)) if reason == "decoder crashed"
        ));
    }

    #[test]
    fn test_memory_sink_rejects_resized_frames() {
        let mut sink = MemorySink::new();
        sink.write_frame(&Frame::filled(4, 4, [0, 0, 0], 1)).unwrap();

        assert!(matches!(
            sink.write_frame(&Frame::filled(4, 5, [0, 0, 0], 2)),
            Err(VideoError::FrameSize { expected: (4, 4), actual: (4, 5) })
        ));

        sink.finish().unwrap();
        assert!(sink.is_finished());
        assert!(sink.write_frame(&Frame::filled(4, 4, [0, 0, 0], 3)).is_err());
    }

    #[test]
    fn test_memory_sink_with_fixed_dimensions() {
        let mut sink = MemorySink::with_dimensions(6, 3);

        assert!(matches!(
            sink.write_frame(&Frame::filled(3, 6, [0, 0, 0], 1)),
            Err(VideoError::FrameSize { expected: (6, 3), actual: (3, 6) })
        ));
        assert!(sink.frames().is_empty());
        sink.write_frame(&Frame::filled(6, 3, [0, 0, 0], 2)).unwrap();
        assert_eq!(sink.frames().len(), 1);
    }
}
