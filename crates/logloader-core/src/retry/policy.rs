use std::fmt;
use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of an error for logging and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Server-side failure (5xx).
    Http5xx(u16),
    /// Anything else (4xx, unexpected status, local problems).
    Other,
}

impl ErrorKind {
    /// The failure says more about the archive than about the file: later
    /// files would most likely fail the same way, so the caller should back off.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Throttled | ErrorKind::Connection
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Throttled => write!(f, "throttled"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Http5xx(code) => write!(f, "http {}", code),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Exponential backoff with a cap. There is no attempt limit.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Upper bound on the delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let base_delay = Duration::try_from_secs_f64(cfg.base_delay_secs).unwrap_or_default();
        Self {
            base_delay,
            max_delay: Duration::from_secs(cfg.max_delay_secs).max(base_delay),
        }
    }
}

impl RetryPolicy {
    /// Policy from the optional `[retry]` config section.
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        cfg.map(Self::from).unwrap_or_default()
    }

    /// Delay before the next try after `attempt` consecutive failures (1-based):
    /// base * 2^(attempt-1), capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }
}
