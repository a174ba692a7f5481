//! Multipart `POST /upload`.

use std::path::Path;
use std::str;
use std::time::Duration;

use super::{ArchiveEndpoint, UploadError, UploadForm, UploadReceipt, FILE_CONTENT_TYPE, FILE_FIELD};
use crate::checksum::sha256_bytes;
use crate::control::Shutdown;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Abort if fewer than `LOW_SPEED_LIMIT` bytes/s move for `LOW_SPEED_TIME`.
const LOW_SPEED_LIMIT: u32 = 1024;
const LOW_SPEED_TIME: Duration = Duration::from_secs(60);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(3600);

/// Upload `path` and resolve the created resource from the 302 `Location`.
///
/// A stalled archive fails the upload after `LOW_SPEED_TIME`. If `shutdown`
/// is given, triggering it aborts the transfer within about a second.
pub(crate) fn post_log(
    endpoint: &ArchiveEndpoint,
    form: &UploadForm,
    path: &Path,
    shutdown: Option<&Shutdown>,
) -> Result<UploadReceipt, UploadError> {
    let data = std::fs::read(path).map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = data.len() as u64;
    let sha256 = sha256_bytes(&data);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut multipart = curl::easy::Form::new();
    for (name, value) in form.fields() {
        multipart.part(name).contents(value.as_bytes()).add()?;
    }
    multipart
        .part(FILE_FIELD)
        .buffer(&file_name, data)
        .content_type(FILE_CONTENT_TYPE)
        .add()?;

    let url = endpoint.upload_url();
    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str())?;
    easy.follow_location(false)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.low_speed_limit(LOW_SPEED_LIMIT)?;
    easy.low_speed_time(LOW_SPEED_TIME)?;
    easy.timeout(TOTAL_TIMEOUT)?;
    easy.progress(shutdown.is_some())?;
    let mut headers = curl::easy::List::new();
    headers.append("Expect:")?;
    easy.http_headers(headers)?;
    easy.httppost(multipart)?;

    let mut location = None;
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Ok(s) = str::from_utf8(line) {
                if let Some(v) = header_value(s, "location") {
                    location = Some(v.to_string());
                }
            }
            true
        })?;
        transfer.write_function(|body| Ok(body.len()))?;
        if let Some(shutdown) = shutdown {
            // libcurl calls this at least once a second, even while stalled.
            transfer.progress_function(|_, _, _, _| !shutdown.is_triggered())?;
        }
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    if status != 302 {
        return Err(UploadError::UnexpectedStatus { status });
    }
    let location = location.ok_or(UploadError::MissingLocation)?;
    let url = endpoint.resolve_location(&location)?;
    Ok(UploadReceipt { url, bytes, sha256 })
}

/// Value of header `name` (case-insensitive) in a raw header line.
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (k, v) = line.split_once(':')?;
    if k.trim().eq_ignore_ascii_case(name) {
        let v = v.trim();
        (!v.is_empty()).then_some(v)
    } else {
        None
    }
}
