//! Progress reporting for log downloads (bytes done, rate, ETA).
//!
//! Purely informational: the CLI prints these, nothing else reads them.

/// Snapshot of one log download's progress.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Log date being downloaded.
    pub date: String,
    /// Bytes transferred so far (fraction reported by the link × final size).
    pub bytes_done: u64,
    /// Final size in bytes.
    pub total_bytes: u64,
    /// Elapsed time since download start (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Build from the link's fraction in `[0, 1]`; out-of-range fractions are clamped.
    pub fn from_fraction(date: &str, fraction: f32, total_bytes: u64, elapsed_secs: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            f64::from(fraction.clamp(0.0, 1.0))
        };
        Self {
            date: date.to_string(),
            bytes_done: (fraction * total_bytes as f64).round() as u64,
            total_bytes,
            elapsed_secs,
        }
    }

    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Download rate in kilobits per second.
    pub fn kbps(&self) -> f64 {
        self.bytes_per_sec() * 8.0 / 1000.0
    }

    /// Estimated seconds remaining (None if rate is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.bytes_done >= self.total_bytes
    }
}
