use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the vehicle outside of a log transfer.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unsupported vehicle endpoint: {0}")]
    UnsupportedEndpoint(String),

    #[error("timed out after {timeout_secs:.1}s waiting for vehicle at {endpoint}")]
    ConnectTimeout { endpoint: String, timeout_secs: f64 },

    #[error("failed to list logs at {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("vehicle link: {0}")]
    Other(String),
}

/// Terminal non-success status of a log transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("transfer timed out")]
    Timeout,

    #[error("log no longer available on the vehicle")]
    NotFound,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("transfer ended without a terminal status")]
    Abandoned,

    #[error("{0}")]
    Link(String),
}
