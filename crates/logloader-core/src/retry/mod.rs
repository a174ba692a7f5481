//! Backoff pacing and error classification.
//!
//! Nothing in logloader gives up for good: a failed catalog fetch, vehicle
//! connect, or upload is always tried again later. This module decides how long
//! "later" is and classifies archive transport errors for logging.

mod classify;
mod policy;

pub use classify::{classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryPolicy};
