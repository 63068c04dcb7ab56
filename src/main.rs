//! fdiff CLI
//!
//! Renders a motion-annotated copy of a video and reports frozen segments.

use clap::Parser;
use fdiff::{
    metrics::MetricsRegistry,
    pipeline::{StreamingDriver, ThroughputLogger},
    video::{FfmpegSink, FfmpegSource, FrameSink, FrameSource, ImageSequenceSink, ImageSequenceSource},
    FileConfig, PipelineError, RunSummary,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Visualize frame-to-frame motion and flag frozen footage.
#[derive(Debug, Parser)]
#[command(name = "fdiff", version, about)]
struct Cli {
    /// Input video file, or a directory of PNG frames.
    input: PathBuf,

    /// Output video (default: input path plus the configured suffix).
    output: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the output as a directory of PNG frames instead of a video.
    #[arg(long)]
    png_sequence: bool,

    /// Write Prometheus metrics text here when the run ends.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("fdiff v{}", fdiff::VERSION);

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Invalid configuration {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => FileConfig::default(),
    };

    match run(&cli, config) {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_source(input: &Path, config: &FileConfig) -> Result<Box<dyn FrameSource>, PipelineError> {
    if input.is_dir() {
        let source = ImageSequenceSource::open(input, config.output.sequence_frame_rate)?;
        Ok(Box::new(source))
    } else {
        Ok(Box::new(FfmpegSource::open(input)?))
    }
}

fn run(cli: &Cli, mut config: FileConfig) -> Result<RunSummary, PipelineError> {
    if let Some(path) = &cli.metrics_out {
        config.output.metrics_path = Some(path.clone());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output.derive_output_path(&cli.input, cli.png_sequence));

    let source = open_source(&cli.input, &config)?;
    let info = source.info().clone();
    let out_height = config.layout.output_height(info.height);

    let sink: Box<dyn FrameSink> = if cli.png_sequence {
        Box::new(ImageSequenceSink::create(&output)?)
    } else {
        Box::new(FfmpegSink::open(
            &output,
            info.width,
            out_height,
            &info.encoder_rate(),
            &config.output.codec,
        )?)
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        warn!("Ctrl-C handler not installed: {}", e);
    }

    let mut driver = StreamingDriver::from_config(source, sink, &config)?.with_stop_flag(stop);
    if config.output.progress_interval > 0 {
        driver = driver.with_observer(Box::new(ThroughputLogger::new(
            config.output.progress_interval,
            info.frame_count,
        )));
    }

    let metrics = match &config.output.metrics_path {
        Some(_) => match MetricsRegistry::new() {
            Ok(registry) => Some(Arc::new(Mutex::new(registry))),
            Err(e) => {
                warn!("Metrics disabled: {}", e);
                None
            }
        },
        None => None,
    };
    if let Some(registry) = &metrics {
        driver = driver.with_observer(Box::new(Arc::clone(registry)));
    }

    info!(
        input = %cli.input.display(),
        output = %output.display(),
        "Processing frames..."
    );
    let summary = driver.run()?;

    if let (Some(registry), Some(path)) = (&metrics, &config.output.metrics_path) {
        match registry.lock() {
            Ok(registry) => {
                if let Err(e) = registry.write_to(path) {
                    warn!("Failed to write metrics: {}", e);
                }
            }
            Err(_) => warn!("Metrics registry poisoned, not written"),
        }
    }

    if summary.interrupted {
        warn!("Stopped early after {} frames", summary.frames_written);
    }
    Ok(summary)
}

fn report(summary: &RunSummary) {
    let stats = &summary.statistics;
    println!(
        "frames: {}  mean severity: {:.6}  peak severity: {:.6}{}",
        summary.frames_written,
        stats.mean_severity(),
        stats.peak_severity,
        stats
            .peak_frame
            .map(|f| format!(" (frame {f})"))
            .unwrap_or_default()
    );

    if summary.frozen_segments.is_empty() {
        println!("no frozen segments");
        return;
    }
    for segment in &summary.frozen_segments {
        println!(
            "frozen: frames {}-{} ({} frames)",
            segment.start_frame,
            segment.end_frame,
            segment.frame_count()
        );
    }
}
