//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - Peak Fitness server address
//! - Counter refresh interval
//! - Request timeout
//!
//! `PEAK_FITNESS_API_URL` overrides the configured server address.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PeakError, Result};

/// Default server address
pub const DEFAULT_API_URL: &str = "https://www.peak-fitness.live/api";

/// Environment variable that overrides `api_url`
pub const API_URL_ENV: &str = "PEAK_FITNESS_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Peak Fitness API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// How often visible counters are re-read from the server, in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().to_path_buf())
    }

    /// Get the directory for TUI log files
    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "peak-fitness", "peak-fitness")
            .ok_or_else(|| PeakError::Config("Could not determine config directory".into()))
    }

    /// Server address in effect: environment override first, then the file
    pub fn effective_api_url(&self) -> String {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api_url.clone(),
        }
    }

    /// Set the server address after checking it parses as an http(s) URL
    pub fn set_api_url(&mut self, value: &str) -> Result<()> {
        self.api_url = validate_api_url(value)?;
        Ok(())
    }

    /// Set the refresh interval (must be at least one second)
    pub fn set_refresh_interval(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(PeakError::InvalidInput(
                "Refresh interval must be at least 1 second".to_string(),
            ));
        }
        self.refresh_interval_secs = secs;
        Ok(())
    }

    /// Set the request timeout (must be at least one second)
    pub fn set_request_timeout(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(PeakError::InvalidInput(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        self.request_timeout_secs = secs;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Check that a server address is an absolute http(s) URL
///
/// Returns the address without a trailing slash.
pub fn validate_api_url(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| PeakError::InvalidInput(format!("Invalid API URL '{}': {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PeakError::InvalidInput(format!(
            "Invalid API URL '{}': only http and https are supported",
            trimmed
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://www.peak-fitness.live/api");
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_api_url("http://localhost:8080/api/").unwrap();
        config.set_refresh_interval(30).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "http://localhost:8080/api");
        assert_eq!(loaded.refresh_interval_secs, 30);
        assert_eq!(loaded.request_timeout_secs, 15);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "refresh_interval_secs = 10\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.refresh_interval_secs, 10);
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(validate_api_url("not a url").is_err());
        assert!(validate_api_url("ftp://example.com/api").is_err());
        assert_eq!(
            validate_api_url("https://example.com/api").unwrap(),
            "https://example.com/api"
        );
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let mut config = Config::default();
        assert!(config.set_refresh_interval(0).is_err());
        assert!(config.set_request_timeout(0).is_err());
        assert_eq!(config.refresh_interval_secs, 5);
    }
}
