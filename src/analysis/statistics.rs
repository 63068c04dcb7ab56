//! Per-run severity statistics.

/// Aggregate severity over the analyzed frames of one run.
///
/// Frames without a predecessor carry no data and are not recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Frames that had a previous frame to compare against.
    pub frames_analyzed: u64,
    /// Sum of severity scores, for the mean.
    severity_sum: f64,
    /// Largest severity seen.
    pub peak_severity: f64,
    /// Source frame index of the peak.
    pub peak_frame: Option<u64>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the severity of frame `index`.
    pub fn record(&mut self, index: u64, severity: f64) {
        self.frames_analyzed += 1;
        self.severity_sum += severity;
        if self.peak_frame.is_none() || severity > self.peak_severity {
            self.peak_severity = severity;
            self.peak_frame = Some(index);
        }
    }

    /// Mean severity, 0 when nothing was analyzed.
    pub fn mean_severity(&self) -> f64 {
        if self.frames_analyzed == 0 {
            return 0.0;
        }
        self.severity_sum / self.frames_analyzed as f64
    }
}
