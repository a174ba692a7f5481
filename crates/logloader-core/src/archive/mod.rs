//! Archive client: reachability probe and multipart log upload over libcurl.
//!
//! Calls block; async callers go through `spawn_blocking`.

mod endpoint;
mod error;
mod form;
mod probe;
mod upload;

pub use endpoint::ArchiveEndpoint;
pub use error::UploadError;
pub use form::{UploadForm, FILE_CONTENT_TYPE, FILE_FIELD};

use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::config::Settings;
use crate::control::Shutdown;

/// Where a log ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Absolute URL of the created resource.
    pub url: Url,
    pub bytes: u64,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
}

/// Destination for completed logs.
pub trait Archive: Send + Sync {
    /// True only if the archive answered its root with HTTP 200.
    fn probe(&self) -> bool;

    /// Upload one log. Success means the archive redirected to the created resource.
    fn upload(&self, path: &Path) -> Result<UploadReceipt, UploadError>;
}

/// HTTP archive (review server) reached with libcurl.
#[derive(Debug, Clone)]
pub struct CurlArchive {
    endpoint: ArchiveEndpoint,
    form: UploadForm,
    probe_timeout: Duration,
    shutdown: Option<Shutdown>,
}

impl CurlArchive {
    pub fn new(endpoint: ArchiveEndpoint, form: UploadForm) -> Self {
        Self {
            endpoint,
            form,
            probe_timeout: probe::DEFAULT_TIMEOUT,
            shutdown: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, UploadError> {
        let endpoint = ArchiveEndpoint::parse(&settings.server)?;
        Ok(Self::new(
            endpoint,
            UploadForm::new(settings.email.clone(), settings.public_logs),
        ))
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Abort an in-flight upload once `shutdown` is triggered.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn endpoint(&self) -> &ArchiveEndpoint {
        &self.endpoint
    }
}

impl Archive for CurlArchive {
    fn probe(&self) -> bool {
        match probe::get_status(self.endpoint.root_url(), self.probe_timeout) {
            Ok(200) => true,
            Ok(code) => {
                tracing::debug!(url = %self.endpoint.root_url(), code, "archive probe: unexpected status");
                false
            }
            Err(e) => {
                tracing::debug!(url = %self.endpoint.root_url(), "archive probe failed: {}", e);
                false
            }
        }
    }

    fn upload(&self, path: &Path) -> Result<UploadReceipt, UploadError> {
        upload::post_log(&self.endpoint, &self.form, path, self.shutdown.as_ref())
    }
}
