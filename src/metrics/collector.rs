//! Metrics collection and registry.

use crate::analysis::BUCKETS;
use crate::pipeline::{FrameObserver, FrameReport, RunSummary, ThroughputLogger};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),
}

/// Prometheus registry fed by the streaming driver.
pub struct MetricsRegistry {
    registry: Registry,

    // Stream metrics
    frames_total: IntCounter,
    static_frames_total: IntCounter,
    frozen_segments: IntGauge,
    frames_per_second: Gauge,

    // Motion metrics
    severity: Gauge,
    peak_severity: Gauge,
    bucket_percent: IntGaugeVec,

    busy: Duration,
}

impl MetricsRegistry {
    /// Creates a registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new("fdiff_frames_total", "Annotated frames written")?;
        let static_frames_total = IntCounter::new(
            "fdiff_static_frames_total",
            "Frames judged near-static by the freeze criteria",
        )?;
        let frozen_segments = IntGauge::new(
            "fdiff_frozen_segments",
            "Frozen segments detected in the finished run",
        )?;
        let frames_per_second = Gauge::new(
            "fdiff_pipeline_frames_per_second",
            "Frames analyzed and rendered per second of pipeline time",
        )?;

        let severity = Gauge::new("fdiff_severity", "Severity score of the latest frame")?;
        let peak_severity = Gauge::new("fdiff_peak_severity", "Largest severity score seen")?;
        let bucket_percent = IntGaugeVec::new(
            Opts::new(
                "fdiff_bucket_occupancy_percent",
                "Percentage of pixels exceeding each threshold in the latest frame",
            ),
            &["threshold"],
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(static_frames_total.clone()))?;
        registry.register(Box::new(frozen_segments.clone()))?;
        registry.register(Box::new(frames_per_second.clone()))?;
        registry.register(Box::new(severity.clone()))?;
        registry.register(Box::new(peak_severity.clone()))?;
        registry.register(Box::new(bucket_percent.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            static_frames_total,
            frozen_segments,
            frames_per_second,
            severity,
            peak_severity,
            bucket_percent,
            busy: Duration::ZERO,
        })
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the text encoding to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), MetricsError> {
        std::fs::write(path.as_ref(), self.encode()?)?;
        tracing::info!(path = %path.as_ref().display(), "Metrics written");
        Ok(())
    }
}

impl FrameObserver for MetricsRegistry {
    fn on_frame(&mut self, report: &FrameReport<'_>) {
        self.frames_total.inc();
        if report.is_static == Some(true) {
            self.static_frames_total.inc();
        }

        self.severity.set(report.severity);
        if report.severity > self.peak_severity.get() {
            self.peak_severity.set(report.severity);
        }

        for bucket in BUCKETS.iter() {
            let label = bucket.threshold.to_string();
            let percent = report.sweep.percent_at(bucket.threshold);
            self.bucket_percent
                .with_label_values(&[label.as_str()])
                .set(percent as i64);
        }

        self.busy += report.elapsed;
        self.frames_per_second
            .set(ThroughputLogger::rate(self.frames_total.get(), self.busy));
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        self.frozen_segments.set(summary.frozen_segments.len() as i64);
    }
}

/// Forwards to a shared registry, so the caller can still encode it after the run.
impl FrameObserver for std::sync::Arc<std::sync::Mutex<MetricsRegistry>> {
    fn on_frame(&mut self, report: &FrameReport<'_>) {
        if let Ok(mut registry) = self.lock() {
            registry.on_frame(report);
        }
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        if let Ok(mut registry) = self.lock() {
            registry.on_finish(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiffFrame, SweepResult, ThresholdSweep};
    use crate::video::Frame;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let mut registry = MetricsRegistry::new().unwrap();
        let a = Frame::filled(2, 2, [0, 0, 0], 1);
        let mut b = a.clone();
        b.set_pixel(0, 0, [0, 0, 60]);
        let sweep = ThresholdSweep::new().analyze(&DiffFrame::compute(&a, &b).unwrap());

        registry.on_frame(&FrameReport {
            index: 2,
            sweep: &sweep,
            severity: 0.25,
            is_static: Some(false),
            elapsed: Duration::from_millis(10),
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("fdiff_frames_total 1"));
        assert!(output.contains("fdiff_severity 0.25"));
        assert!(output.contains("fdiff_bucket_occupancy_percent{threshold=\"45\"} 25"));
        assert!(output.contains("fdiff_static_frames_total 0"));
    }

    #[test]
    fn test_empty_sweep_reports_zero_occupancy() {
        let mut registry = MetricsRegistry::new().unwrap();
        let sweep = SweepResult::empty();
        registry.on_frame(&FrameReport {
            index: 1,
            sweep: &sweep,
            severity: 0.0,
            is_static: None,
            elapsed: Duration::ZERO,
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("fdiff_bucket_occupancy_percent{threshold=\"0\"} 0"));
        assert!(output.contains("fdiff_pipeline_frames_per_second 0"));
    }
}
