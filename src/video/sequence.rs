//! Directories of numbered PNG files as frame sources and sinks.

use super::{Frame, FrameSink, FrameSource, StreamInfo, VideoError};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads every `*.png` in a directory, in file name order.
pub struct ImageSequenceSource {
    info: StreamInfo,
    paths: std::vec::IntoIter<PathBuf>,
    sequence: u64,
}

impl ImageSequenceSource {
    /// Lists `dir` and sizes the stream from the first image.
    pub fn open(dir: impl AsRef<Path>, frame_rate: f64) -> Result<Self, VideoError> {
        let dir = dir.as_ref();
        let unreadable = |reason: String| VideoError::SourceUnreadable {
            path: dir.to_path_buf(),
            reason,
        };

        let entries = fs::read_dir(dir).map_err(|e| unreadable(e.to_string()))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| unreadable("directory contains no PNG frames".into()))?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| unreadable(format!("{}: {e}", first.display())))?;

        tracing::info!(
            path = %dir.display(),
            width,
            height,
            frames = paths.len(),
            "Opened image sequence input"
        );

        Ok(Self {
            info: StreamInfo {
                width,
                height,
                frame_rate,
                frame_rate_ratio: None,
                frame_count: paths.len() as u64,
            },
            paths: paths.into_iter(),
            sequence: 0,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn read_next(&mut self) -> Result<Option<Frame>, VideoError> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .map_err(|e| VideoError::TransportRead(format!("{}: {e}", path.display())))?
            .into_rgb8();
        let (width, height) = image.dimensions();

        self.sequence += 1;
        let frame = Frame::new(image.into_raw(), width, height, self.sequence)
            .map_err(|e| VideoError::TransportRead(e.to_string()))?;
        Ok(Some(frame))
    }
}

/// Writes each frame as `frame_000001.png`, `frame_000002.png`, ...
pub struct ImageSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl ImageSequenceSink {
    /// Creates `dir` (and parents) if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, VideoError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| VideoError::SinkUnwritable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::info!(path = %dir.display(), "Opened image sequence output");
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        let path = self.dir.join(format!("frame_{:06}.png", self.written + 1));
        image::save_buffer(
            &path,
            frame.pixels(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| VideoError::SinkUnwritable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        tracing::info!(path = %self.dir.display(), frames = self.written, "Image sequence finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fdiff-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_sequence_written_frames_read_back() {
        let dir = scratch_dir("seq-roundtrip");
        let mut sink = ImageSequenceSink::create(&dir).unwrap();
        let mut first = Frame::filled(5, 3, [10, 20, 30], 1);
        first.set_pixel(4, 2, [200, 0, 100]);
        sink.write_frame(&first).unwrap();
        sink.write_frame(&Frame::filled(5, 3, [1, 1, 1], 2)).unwrap();
        sink.finish().unwrap();

        let mut source = ImageSequenceSource::open(&dir, 12.0).unwrap();
        assert_eq!(source.info().frame_count, 2);
        assert_eq!((source.info().width, source.info().height), (5, 3));

        let read = source.read_next().unwrap().unwrap();
        assert_eq!(read.pixels(), first.pixels());
        assert_eq!(read.sequence(), 1);
        assert!(source.read_next().unwrap().is_some());
        assert!(source.read_next().unwrap().is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_is_unreadable() {
        let dir = scratch_dir("seq-empty");
        fs::create_dir_all(&dir).unwrap();

        assert!(matches!(
            ImageSequenceSource::open(&dir, 25.0),
            Err(VideoError::SourceUnreadable { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
