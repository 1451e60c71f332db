use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/plm/config.toml`.
///
/// Missing fields fall back to the defaults below, so a partial config file
/// (or none at all) is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlmConfig {
    /// Directory the mirror writes into. Wiped and recreated on every run.
    /// Relative paths are resolved against the working directory.
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds (covers the whole GET, not just connect).
    pub request_timeout_secs: u64,
    /// Maximum attempts per file, including the first.
    pub max_attempts: u32,
    /// Number of files fetched concurrently.
    pub max_workers: usize,
    /// User-Agent sent with every request. Some playlist hosts reject the
    /// default curl identifier, so this must stay non-empty.
    pub user_agent: String,
    /// When true, a run with failed downloads still counts as a success
    /// (mirrors flaky sources best-effort). Default is to fail the run.
    pub best_effort: bool,
}

impl Default for PlmConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("playlists"),
            request_timeout_secs: 10,
            max_attempts: 3,
            max_workers: 5,
            user_agent: "Mozilla/5.0".to_string(),
            best_effort: false,
        }
    }
}

impl PlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("plm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PlmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PlmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PlmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
