use std::path::PathBuf;
use thiserror::Error;

use crate::retry::{classify_curl_error, classify_http_status, ErrorKind};

/// Failure to place one log in the archive.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid archive server {0:?}")]
    InvalidServer(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport: {0}")]
    Curl(#[from] curl::Error),

    #[error("building upload form: {0}")]
    Form(#[from] curl::FormError),

    #[error("archive answered HTTP {status}, expected 302")]
    UnexpectedStatus { status: u32 },

    #[error("archive redirect carried no Location header")]
    MissingLocation,

    #[error("archive returned an unusable Location {0:?}")]
    InvalidLocation(String),
}

impl UploadError {
    /// Coarse class for logging.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Curl(e) => classify_curl_error(e),
            UploadError::UnexpectedStatus { status } => classify_http_status(*status),
            _ => ErrorKind::Other,
        }
    }
}
