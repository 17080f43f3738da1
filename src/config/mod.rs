//! Configuration management module
//!
//! Provides centralized configuration including:
//! - Log file path (`$HOME/.alert-dashboard/debug.log`)
//! - Backend URL and toast timings
//!
//! Backend URL precedence: `--backend` flag, then the
//! `ALERT_DASHBOARD_BACKEND_URL` environment variable, then `backendUrl` in
//! `$HOME/.alert-dashboard/config.json`, then the local default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::ui::toast::ToastTimings;

/// Environment variable overriding the backend URL
pub const BACKEND_URL_ENV: &str = "ALERT_DASHBOARD_BACKEND_URL";

/// Backend the dashboard talks to when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5001";

/// Optional keys of `config.json`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub toast_dwell_ms: Option<u64>,
}

impl FileConfig {
    /// Read `path`. A missing file is an empty config; an unreadable or invalid one is an error.
    pub fn read(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub toast_timings: ToastTimings,
}

impl Config {
    /// Load from the config file and environment, with an optional CLI override
    pub fn load(cli_backend: Option<&str>) -> Result<Self> {
        let file = FileConfig::read(&Self::config_file_path())?;
        let env = std::env::var(BACKEND_URL_ENV).ok();
        Self::resolve(file, env.as_deref(), cli_backend)
    }

    /// Merge the sources in precedence order and validate the URL
    pub fn resolve(file: FileConfig, env_backend: Option<&str>, cli_backend: Option<&str>) -> Result<Self> {
        let backend_url = non_empty(cli_backend)
            .or_else(|| non_empty(env_backend))
            .or_else(|| non_empty(file.backend_url.as_deref()))
            .unwrap_or(DEFAULT_BACKEND_URL)
            .to_string();

        let parsed = Url::parse(&backend_url).with_context(|| format!("Invalid backend URL '{}'", backend_url))?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "Backend URL must be http or https, got '{}'",
            backend_url
        );

        let mut toast_timings = ToastTimings::default();
        if let Some(ms) = file.toast_dwell_ms {
            toast_timings.dwell = Duration::from_millis(ms);
        }

        Ok(Self {
            backend_url,
            toast_timings,
        })
    }

    /// Base directory: `$HOME/.alert-dashboard`, or the temp directory if HOME is not set
    pub fn base_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".alert-dashboard");
        }
        std::env::temp_dir().join("alert-dashboard")
    }

    /// Get the log file path
    pub fn log_file_path() -> PathBuf {
        Self::base_dir().join("debug.log")
    }

    /// Get the config file path
    pub fn config_file_path() -> PathBuf {
        Self::base_dir().join("config.json")
    }

    /// Ensure the log directory exists
    pub fn ensure_log_directory() -> std::io::Result<()> {
        std::fs::create_dir_all(Self::base_dir())
    }

    /// Package version from CARGO_PKG_VERSION
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Trimmed value, or None when blank
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            toast_timings: ToastTimings::default(),
        }
    }
}
