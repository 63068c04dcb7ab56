//! Video file input and output through the `ffmpeg`/`ffprobe` binaries.
//!
//! Frames cross the process boundary as raw `rgb24` over pipes, so no
//! codec library is linked. Binary locations can be overridden with the
//! `FDIFF_FFMPEG` and `FDIFF_FFPROBE` environment variables.

use super::{Frame, FrameSink, FrameSource, StreamInfo, VideoError, CHANNELS};
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn ffmpeg_bin() -> String {
    env::var("FDIFF_FFMPEG").unwrap_or_else(|_| "ffmpeg".into())
}

fn ffprobe_bin() -> String {
    env::var("FDIFF_FFPROBE").unwrap_or_else(|_| "ffprobe".into())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// Parses an ffprobe rational such as `30000/1001`.
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((n, d)) => (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };
    if num <= 0.0 || den <= 0.0 {
        return None;
    }
    Some(num / den)
}

fn probe(path: &Path) -> Result<StreamInfo, VideoError> {
    let unreadable = |reason: String| VideoError::SourceUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let output = Command::new(ffprobe_bin())
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames",
            "-print_format",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| unreadable(format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        return Err(unreadable(format!("ffprobe failed: {stderr}")));
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| unreadable(format!("unexpected ffprobe output: {e}")))?;
    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| unreadable("no video stream".into()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(unreadable("video stream has no dimensions".into())),
    };
    let (frame_rate, ratio) = [stream.r_frame_rate, stream.avg_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|ratio| parse_rate(&ratio).map(|rate| (rate, ratio)))
        .ok_or_else(|| unreadable("video stream has no frame rate".into()))?;
    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(StreamInfo {
        width,
        height,
        frame_rate,
        frame_rate_ratio: Some(ratio.trim().to_owned()),
        frame_count,
    })
}

/// Decoder command line. Autorotation stays off so decoded frames keep the
/// stored dimensions ffprobe reported.
fn decoder_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostdin",
        "-noautorotate",
        "-i",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(
        ["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]
            .into_iter()
            .map(OsString::from),
    );
    args
}

/// Encoder command line reading rgb24 from stdin.
fn encoder_args(path: &Path, width: u32, height: u32, rate: &str, codec: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
        .into_iter()
        .chain(["-f", "rawvideo", "-pix_fmt", "rgb24"])
        .map(OsString::from)
        .collect();
    args.push("-s".into());
    args.push(format!("{width}x{height}").into());
    args.push("-r".into());
    args.push(rate.into());
    args.extend(
        ["-i", "-", "-an", "-c:v", codec, "-pix_fmt", "yuv420p"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(path.as_os_str().to_owned());
    args
}

/// Decodes a video file into RGB24 frames.
pub struct FfmpegSource {
    path: PathBuf,
    info: StreamInfo,
    child: Child,
    stdout: Option<ChildStdout>,
    sequence: u64,
}

impl FfmpegSource {
    /// Probes and opens `path` for decoding.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VideoError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: "file does not exist".into(),
            });
        }

        let info = probe(path)?;
        if info.frame_count == 0 {
            tracing::warn!(path = %path.display(), "frame count unknown");
        }

        let mut child = Command::new(ffmpeg_bin())
            .args(decoder_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| VideoError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: format!("failed to start ffmpeg: {e}"),
            })?;
        let stdout = child.stdout.take();

        tracing::info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.frame_rate,
            frames = info.frame_count,
            "Opened video input"
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
            child,
            stdout,
            sequence: 0,
        })
    }

    fn frame_bytes(&self) -> usize {
        (self.info.width as usize) * (self.info.height as usize) * CHANNELS
    }

    /// Reaps the decoder once its output is drained.
    fn finish_decoder(&mut self) -> Result<(), VideoError> {
        self.stdout = None;
        let status = self
            .child
            .wait()
            .map_err(|e| VideoError::TransportRead(format!("failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(VideoError::TransportRead(format!(
                "ffmpeg exited with {status} while decoding {}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn read_next(&mut self) -> Result<Option<Frame>, VideoError> {
        let frame_bytes = self.frame_bytes();
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; frame_bytes];
        let mut filled = 0;
        while filled < frame_bytes {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(VideoError::TransportRead(e.to_string())),
            }
        }

        if filled == 0 {
            self.finish_decoder()?;
            tracing::debug!(frames = self.sequence, "Decoder reached end of stream");
            return Ok(None);
        }
        if filled < frame_bytes {
            return Err(VideoError::TransportRead(format!(
                "truncated frame: got {filled} of {frame_bytes} bytes"
            )));
        }

        self.sequence += 1;
        let frame = Frame::new(buf, self.info.width, self.info.height, self.sequence)
            .map_err(|e| VideoError::TransportRead(e.to_string()))?;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if self.stdout.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Encodes RGB24 frames into a video file.
pub struct FfmpegSink {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<ChildStdin>,
    written: u64,
}

impl FfmpegSink {
    /// Starts an encoder writing `path`; an existing file is replaced.
    ///
    /// `frame_rate` is passed to ffmpeg verbatim, so a ratio such as
    /// `30000/1001` stays exact (see [`StreamInfo::encoder_rate`]).
    pub fn open(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        frame_rate: &str,
        codec: &str,
    ) -> Result<Self, VideoError> {
        let path = path.as_ref();
        let unwritable = |reason: String| VideoError::SinkUnwritable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(unwritable(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
        }

        let mut child = Command::new(ffmpeg_bin())
            .args(encoder_args(path, width, height, frame_rate, codec))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| unwritable(format!("failed to start ffmpeg: {e}")))?;
        let stdin = child.stdin.take();

        tracing::info!(
            path = %path.display(),
            width,
            height,
            fps = frame_rate,
            codec,
            "Opened video output"
        );

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            child,
            stdin,
            written: 0,
        })
    }

    fn unwritable(&self, reason: String) -> VideoError {
        VideoError::SinkUnwritable {
            path: self.path.clone(),
            reason,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(VideoError::FrameSize {
                expected: (self.width, self.height),
                actual: frame.dimensions(),
            });
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| VideoError::SinkUnwritable {
                path: self.path.clone(),
                reason: "encoder already finished".into(),
            })?;
        stdin
            .write_all(frame.pixels())
            .map_err(|e| VideoError::SinkUnwritable {
                path: self.path.clone(),
                reason: format!("encoder pipe: {e}"),
            })?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        stdin
            .flush()
            .map_err(|e| self.unwritable(format!("encoder pipe: {e}")))?;
        drop(stdin);

        let status = self
            .child
            .wait()
            .map_err(|e| self.unwritable(format!("failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(self.unwritable(format!("ffmpeg exited with {status}")));
        }
        tracing::info!(path = %self.path.display(), frames = self.written, "Video output finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Closing stdin lets ffmpeg finalize whatever was written.
        if self.stdin.take().is_some() {
            let _ = self.child.wait();
        }
    }
}
