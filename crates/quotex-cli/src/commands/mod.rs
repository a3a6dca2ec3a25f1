//! Subcommands.

pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use anyhow::Context;
use quotex_core::QuotexConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotex")
        .join("config.json")
}

/// The `--config` path, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Read a configuration file, or the defaults when it does not exist.
pub fn read_or_default(path: &Path) -> anyhow::Result<QuotexConfig> {
    if !path.exists() {
        return Ok(QuotexConfig::default());
    }
    QuotexConfig::from_file(path).with_context(|| format!("Failed to read config {}", path.display()))
}

/// Configuration for a run: an explicit `--config` file must exist, the
/// default location is optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<QuotexConfig> {
    match explicit {
        Some(path) => QuotexConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to read config {}", path)),
        None => read_or_default(&default_config_path()),
    }
}
