use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Backoff parameters for reconnecting and re-polling after failures (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = one second).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Loop pacing (optional section in config.toml). All values in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How often the armed signal is re-read while the vehicle is armed.
    pub armed_poll_secs: f64,
    /// Extra wait after disarm so the vehicle's logger can finish writing.
    pub disarm_grace_secs: f64,
    /// Idle time between catalog reconciliation passes.
    pub catalog_interval_secs: f64,
    /// Idle time between upload directory scans.
    pub upload_interval_secs: f64,
    /// Delay before the first upload scan, so an interrupted download is marked active first.
    pub upload_startup_delay_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            armed_poll_secs: 1.0,
            disarm_grace_secs: 3.0,
            catalog_interval_secs: 10.0,
            upload_interval_secs: 1.0,
            upload_startup_delay_secs: 5.0,
        }
    }
}

impl TimingConfig {
    pub fn armed_poll(&self) -> Duration {
        secs(self.armed_poll_secs)
    }

    pub fn disarm_grace(&self) -> Duration {
        secs(self.disarm_grace_secs)
    }

    pub fn catalog_interval(&self) -> Duration {
        secs(self.catalog_interval_secs)
    }

    pub fn upload_interval(&self) -> Duration {
        secs(self.upload_interval_secs)
    }

    pub fn upload_startup_delay(&self) -> Duration {
        secs(self.upload_startup_delay_secs)
    }
}

/// Negative or NaN values from a hand-edited file collapse to zero.
fn secs(v: f64) -> Duration {
    Duration::try_from_secs_f64(v).unwrap_or(Duration::ZERO)
}

/// Global configuration loaded from `~/.config/logloader/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vehicle link endpoint (e.g. `file:///mnt/vehicle/log`).
    pub connection_url: String,
    /// Directory the vehicle's logs are mirrored into.
    pub logging_directory: PathBuf,
    /// Ledger of uploaded log paths. Defaults to the XDG state dir.
    #[serde(default)]
    pub uploaded_logs_file: Option<PathBuf>,
    /// Archive hostname (`https://` implied) or full base URL.
    pub server: String,
    /// Uploader identity sent with every log.
    pub email: String,
    /// Publish uploaded logs publicly on the archive.
    pub public_logs: bool,
    /// Relay mirrored logs to the archive at all.
    pub upload_enabled: bool,
    /// Timeout for a single vehicle connection attempt.
    pub connect_timeout_secs: f64,
    /// Optional loop pacing; if missing, built-in defaults are used.
    #[serde(default)]
    pub timing: Option<TimingConfig>,
    /// Optional backoff policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection_url: "file:///mnt/vehicle/log".to_string(),
            logging_directory: PathBuf::from("logs"),
            uploaded_logs_file: None,
            server: "logs.px4.io".to_string(),
            email: String::new(),
            public_logs: false,
            upload_enabled: true,
            connect_timeout_secs: 3.0,
            timing: None,
            retry: None,
        }
    }
}

impl Settings {
    pub fn timing(&self) -> TimingConfig {
        self.timing.clone().unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        secs(self.connect_timeout_secs)
    }

    /// Ledger path: the configured file, or `uploaded_logs.txt` in the XDG state dir.
    pub fn ledger_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.uploaded_logs_file {
            return Ok(p.clone());
        }
        let dir = xdg::BaseDirectories::with_prefix("logloader")?
            .get_state_home()
            .join("logloader");
        Ok(dir.join("uploaded_logs.txt"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("logloader")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = Settings::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: Settings =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
