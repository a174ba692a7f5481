pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod control;
pub mod downloader;
pub mod local_logs;
pub mod retry;
pub mod scheduler;
pub mod uploader;
pub mod vehicle;
