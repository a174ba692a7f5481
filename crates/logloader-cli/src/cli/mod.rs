//! CLI for logloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use logloader_core::config::{self, Settings};
use std::path::PathBuf;

use commands::{run_checksum, run_entries, run_pending, run_probe, run_service};

/// Top-level CLI for logloader.
#[derive(Debug, Parser)]
#[command(name = "logloader")]
#[command(about = "Mirror flight logs from a vehicle and relay them to a log archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the download and upload loops until interrupted.
    Run(RunArgs),

    /// List the logs on the vehicle and what the next pass would do with each.
    Entries,

    /// List local logs not yet uploaded.
    Pending,

    /// Check whether the archive is reachable.
    Probe,

    /// Compute SHA-256 of a file (e.g. a mirrored log).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

/// Per-run overrides of config.toml.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Vehicle endpoint (e.g. file:///mnt/vehicle/log).
    #[arg(long, value_name = "URL")]
    pub connection_url: Option<String>,

    /// Directory the logs are mirrored into.
    #[arg(long, value_name = "DIR")]
    pub logging_directory: Option<PathBuf>,

    /// Archive hostname or base URL.
    #[arg(long, value_name = "HOST")]
    pub server: Option<String>,

    /// Uploader email sent with each log.
    #[arg(long)]
    pub email: Option<String>,

    /// Publish uploaded logs publicly.
    #[arg(long)]
    pub public: bool,

    /// Only mirror logs; do not upload.
    #[arg(long)]
    pub no_upload: bool,
}

impl RunArgs {
    /// Apply flags on top of the loaded settings. Flags only ever override.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.connection_url {
            settings.connection_url = url.clone();
        }
        if let Some(dir) = &self.logging_directory {
            settings.logging_directory = dir.clone();
        }
        if let Some(server) = &self.server {
            settings.server = server.clone();
        }
        if let Some(email) = &self.email {
            settings.email = email.clone();
        }
        if self.public {
            settings.public_logs = true;
        }
        if self.no_upload {
            settings.upload_enabled = false;
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;

        match cli.command {
            CliCommand::Run(args) => {
                args.apply(&mut cfg);
                tracing::debug!("effective config: {:?}", cfg);
                run_service(&cfg).await?;
            }
            CliCommand::Entries => run_entries(&cfg).await?,
            CliCommand::Pending => run_pending(&cfg).await?,
            CliCommand::Probe => run_probe(&cfg).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
