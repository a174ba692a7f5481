//! CLI command handlers, one per file.

mod checksum;
mod entries;
mod pending;
mod probe;
mod run;

pub use checksum::run_checksum;
pub use entries::run_entries;
pub use pending::run_pending;
pub use probe::run_probe;
pub use run::run_service;
