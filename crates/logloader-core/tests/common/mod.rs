//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod archive_server;
pub mod fake_archive;
pub mod fake_link;

use logloader_core::config::TimingConfig;

/// Loop pacing short enough for tests.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        armed_poll_secs: 0.01,
        disarm_grace_secs: 0.01,
        catalog_interval_secs: 0.02,
        upload_interval_secs: 0.02,
        upload_startup_delay_secs: 0.0,
    }
}

/// Poll `cond` every 10ms until it holds or `timeout_ms` elapses.
pub async fn wait_until(timeout_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    cond()
}
