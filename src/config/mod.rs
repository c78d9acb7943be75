//! Configuration management for docqa
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! The backend base URL is the only required setting; it may also come from
//! the command line or the `DOCQA_API_BASE_URL` environment variable.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (e.g. http://127.0.0.1:8000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Registry polling configuration
    #[serde(default)]
    pub polling: PollingConfig,

    /// Search request configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Preview file configuration
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Path the config was loaded from (internal, not user-editable)
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Registry polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between refreshes while any document is still processing
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

/// Search request configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of chunks the backend should retrieve (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Preview file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Directory for temporary preview files (system temp dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Config {
    /// Get the default base directory for docqa (~/.docqa)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docqa")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.config_file = config_path.to_path_buf();
        Ok(config)
    }

    /// Load the config file if present, then apply the base URL override.
    ///
    /// The result is validated, so a missing base URL fails here.
    pub fn resolve(config_path: Option<&Path>, api_base_url: Option<String>) -> Result<Self> {
        let path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        let mut config = if path.exists() {
            Self::load(&path)?
        } else if config_path.is_some() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        } else {
            debug!("No config file found, using defaults");
            Config {
                config_file: path,
                ..Config::default()
            }
        };

        if let Some(url) = api_base_url {
            config.api_base_url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to its config file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.config_file, content)?;
        info!("Saved config to {:?}", self.config_file);
        Ok(())
    }

    /// The validated base URL
    pub fn api_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Missing API base URL: pass --api-url, set {}, or add api_base_url to {}",
                    API_BASE_URL_ENV,
                    self.config_file.display()
                ))
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_api_base_url(self.api_base_url()?)?;

        if self.polling.interval_secs == 0 {
            return Err(Error::Config(
                "polling.interval_secs must be positive".to_string(),
            ));
        }

        if self.search.top_n == Some(0) {
            return Err(Error::Config("search.top_n must be positive".to_string()));
        }

        Ok(())
    }
}

/// Check that a base URL is an absolute http(s) URL usable as a base
pub fn validate_api_base_url(value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", value, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "API base URL must be an http(s) URL, got '{}'",
            value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_requires_base_url() {
        let config = Config::default();
        assert_eq!(config.polling.interval_secs, 5);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_base_url_is_missing() {
        let config = Config {
            api_base_url: Some("   ".to_string()),
            ..Config::default()
        };
        let err = config.api_base_url().unwrap_err();
        assert!(err.to_string().contains("Missing API base URL"));
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            api_base_url: Some("http://localhost:8000".to_string()),
            search: SearchConfig { top_n: Some(4) },
            config_file: tmp.path().join("config.toml"),
            ..Config::default()
        };

        config.save().unwrap();
        let loaded = Config::load(&config.config_file).unwrap();
        assert_eq!(loaded.api_base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(loaded.search.top_n, Some(4));
        assert_eq!(loaded.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_override_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_base_url = \"http://file:1\"\n[polling]\ninterval_secs = 2\n")
            .unwrap();

        let config = Config::resolve(Some(&path), Some("http://flag:2".to_string())).unwrap();
        assert_eq!(config.api_base_url().unwrap(), "http://flag:2");
        assert_eq!(config.polling.interval_secs, 2);
    }

    #[test]
    fn test_resolve_missing_explicit_file_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");
        assert!(Config::resolve(Some(&path), Some("http://x".to_string())).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config {
            api_base_url: Some("ftp://example.com".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.api_base_url = Some("https://example.com/api".to_string());
        assert!(config.validate().is_ok());

        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());

        config.polling.interval_secs = 5;
        config.search.top_n = Some(0);
        assert!(config.validate().is_err());
    }
}
