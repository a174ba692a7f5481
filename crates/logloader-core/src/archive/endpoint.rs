use url::Url;

use super::UploadError;

/// Base URL of the log archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEndpoint {
    base: Url,
}

impl ArchiveEndpoint {
    /// `server` is a bare hostname (`logs.px4.io`, HTTPS implied) or a full base URL.
    pub fn parse(server: &str) -> Result<Self, UploadError> {
        let server = server.trim();
        let raw = if server.contains("://") {
            server.to_string()
        } else {
            format!("https://{}/", server)
        };
        let mut base =
            Url::parse(&raw).map_err(|e| UploadError::InvalidServer(format!("{}: {}", server, e)))?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(UploadError::InvalidServer(server.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    /// `GET` target for the reachability probe.
    pub fn root_url(&self) -> &Url {
        &self.base
    }

    /// `POST` target for uploads.
    pub fn upload_url(&self) -> Url {
        self.join("upload")
    }

    /// Absolute URL of a created resource from a `Location` header (relative or absolute).
    pub fn resolve_location(&self, location: &str) -> Result<Url, UploadError> {
        self.base
            .join(location.trim())
            .map_err(|_| UploadError::InvalidLocation(location.to_string()))
    }

    fn join(&self, path: &str) -> Url {
        // Joining a plain relative segment onto a base ending in '/' cannot fail.
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}
