//! Map archive failures onto [`ErrorKind`]. The upload loop backs off on the
//! transient kinds and moves on to the next file for the rest.

use crate::retry::policy::ErrorKind;

/// Status the archive answered a probe or upload with.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        408 | 504 => ErrorKind::Timeout,
        429 | 503 => ErrorKind::Throttled,
        // A proxy in front of the archive could not reach it.
        502 => ErrorKind::Connection,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Transport failure reported by libcurl.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    // Our own shutdown abort, or a local read of the log failing, says
    // nothing about the archive.
    if e.is_aborted_by_callback() || e.is_read_error() {
        return ErrorKind::Other;
    }
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    let unreachable = e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error();
    let dropped =
        e.is_send_error() || e.is_recv_error() || e.is_got_nothing() || e.is_partial_file();
    if unreachable || dropped {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_status_kinds() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
        assert_eq!(classify_http_status(504), ErrorKind::Timeout);
        assert_eq!(classify_http_status(408), ErrorKind::Timeout);
        assert_eq!(classify_http_status(502), ErrorKind::Connection);
        assert_eq!(classify_http_status(500), ErrorKind::Http5xx(500));
    }

    #[test]
    fn rejections_are_not_transient() {
        assert_eq!(classify_http_status(413), ErrorKind::Other);
        assert_eq!(classify_http_status(400), ErrorKind::Other);
        // A 200 where a redirect was expected.
        assert_eq!(classify_http_status(200), ErrorKind::Other);
    }

    #[test]
    fn curl_transport_kinds() {
        // CURLE_COULDNT_CONNECT, CURLE_SEND_ERROR
        assert_eq!(classify_curl_error(&curl::Error::new(7)), ErrorKind::Connection);
        assert_eq!(classify_curl_error(&curl::Error::new(55)), ErrorKind::Connection);
        // CURLE_OPERATION_TIMEDOUT
        assert_eq!(classify_curl_error(&curl::Error::new(28)), ErrorKind::Timeout);
    }

    #[test]
    fn local_aborts_are_not_the_archives_fault() {
        // CURLE_ABORTED_BY_CALLBACK, CURLE_READ_ERROR
        assert_eq!(classify_curl_error(&curl::Error::new(42)), ErrorKind::Other);
        assert_eq!(classify_curl_error(&curl::Error::new(26)), ErrorKind::Other);
    }
}
