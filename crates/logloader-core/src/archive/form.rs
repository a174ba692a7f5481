//! Multipart form sent with every upload.

/// Name of the part carrying the log bytes.
pub const FILE_FIELD: &str = "filearg";

pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

const DESCRIPTION: &str = "Uploaded by logloader";

/// Fixed descriptive metadata attached to each log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub email: String,
    pub public: bool,
}

impl UploadForm {
    pub fn new(email: impl Into<String>, public: bool) -> Self {
        Self {
            email: email.into(),
            public,
        }
    }

    /// Text fields in submission order.
    ///
    /// The archive files public logs as flight reports and everything else
    /// as personal, independent of the `public` field itself.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let kind = if self.public { "flightreport" } else { "personal" };
        vec![
            ("type", kind.to_string()),
            ("description", DESCRIPTION.to_string()),
            ("feedback", String::new()),
            ("email", self.email.clone()),
            ("source", "auto".to_string()),
            ("videoUrl", String::new()),
            ("rating", String::new()),
            ("windSpeed", String::new()),
            ("public", self.public.to_string()),
        ]
    }
}
