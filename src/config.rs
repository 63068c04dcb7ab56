//! File-based configuration.
//!
//! Every section is optional; missing keys fall back to the defaults
//! documented on each struct.

use crate::analysis::{bucket_for, FreezeCriteria};
use crate::render::{Layout, LayoutError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("invalid freeze criteria: {0}")]
    InvalidFreeze(String),
    #[error("invalid frame rate {0} (must be positive)")]
    InvalidFrameRate(f64),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the input path when no output path is given.
    pub suffix: String,
    /// Same, for a PNG-sequence output directory.
    pub sequence_suffix: String,
    /// ffmpeg video encoder name.
    pub codec: String,
    /// Frame rate for PNG-sequence input, which carries none.
    pub sequence_frame_rate: f64,
    /// Where to write Prometheus metrics text after a run.
    pub metrics_path: Option<PathBuf>,
    /// Frames between throughput log lines (0 disables).
    pub progress_interval: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: ".fdiff.mp4".into(),
            sequence_suffix: ".fdiff".into(),
            codec: "mpeg4".into(),
            sequence_frame_rate: 25.0,
            metrics_path: None,
            progress_interval: 250,
        }
    }
}

impl OutputConfig {
    /// Default output path for `input`: a video file, or a frame
    /// directory when `png_sequence` is set.
    pub fn derive_output_path(&self, input: &Path, png_sequence: bool) -> PathBuf {
        let suffix = if png_sequence {
            &self.sequence_suffix
        } else {
            &self.suffix
        };
        let mut name = input.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub freeze: FreezeCriteria,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;

        if bucket_for(self.freeze.threshold).is_none() {
            return Err(ConfigError::InvalidFreeze(format!(
                "threshold {} is not one of the bucket thresholds",
                self.freeze.threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.freeze.max_moving_percent) {
            return Err(ConfigError::InvalidFreeze(format!(
                "max_moving_percent {} is outside 0-100",
                self.freeze.max_moving_percent
            )));
        }
        if self.freeze.min_run == 0 {
            return Err(ConfigError::InvalidFreeze("min_run must be at least 1".into()));
        }

        let fps = self.output.sequence_frame_rate;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError::InvalidFrameRate(fps));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [layout]
            header_height = 50
            footer_height = 0

            [freeze]
            min_run = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.layout.header_height, 50);
        assert_eq!(config.layout.font_scale, 2);
        assert_eq!(config.freeze.min_run, 30);
        assert_eq!(config.freeze.threshold, 5);
        assert_eq!(config.output.codec, "mpeg4");
    }

    #[test]
    fn test_unknown_freeze_threshold_invalid() {
        let mut config = FileConfig::default();
        config.freeze.threshold = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFreeze(_))
        ));
    }

    #[test]
    fn test_bad_layout_invalid() {
        let result = FileConfig::from_toml("[layout]\nheader_height = 4\n");
        assert!(matches!(result, Err(ConfigError::InvalidLayout(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            FileConfig::from_toml("[layout\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_derived_output_path() {
        let output = OutputConfig::default();
        assert_eq!(
            output.derive_output_path(Path::new("clips/a.mov"), false),
            PathBuf::from("clips/a.mov.fdiff.mp4")
        );
    }

    #[test]
    fn test_derived_sequence_directory_has_no_video_extension() {
        let output = OutputConfig::default();
        assert_eq!(
            output.derive_output_path(Path::new("frames"), true),
            PathBuf::from("frames.fdiff")
        );

        let config = FileConfig::from_toml("[output]\nsequence_suffix = \"_annotated\"\n").unwrap();
        assert_eq!(
            config.output.derive_output_path(Path::new("clips/a.mov"), true),
            PathBuf::from("clips/a.mov_annotated")
        );
    }
}
