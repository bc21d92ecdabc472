//! Configuration management for OTA Fetcher
//!
//! Provides a TOML-backed application configuration with zero-config
//! defaults: every field has a sensible default, the config file is
//! optional, and the distribution URL can come from a flag, the config
//! file, or the environment.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ClientConfig;
use crate::constants::cache::DEFAULT_CACHE_DIR_NAME;
use crate::constants::{env as env_constants, http, limits, workers};
use crate::errors::ConfigError;

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Distribution settings
    pub distribution: DistributionConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
}

/// Distribution endpoint and sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Distribution URL; `None` defers to the CLI flag or environment
    pub url: Option<String>,
    /// Cache directory; `None` uses the per-OS default
    pub cache_dir: Option<PathBuf>,
    /// Concurrent locale downloads per refresh
    pub concurrency: usize,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            url: None,
            cache_dir: None,
            concurrency: workers::DEFAULT_CONCURRENCY,
        }
    }
}

/// TOML-friendly HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds
    pub pool_idle_timeout_secs: u64,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: http::POOL_IDLE_TIMEOUT.as_secs(),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or from the default
    /// location, or fall back to defaults when no file exists
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when an explicitly given file cannot be read
    /// or parsed. A missing file at the default location is not an error.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Default configuration file location for the current OS
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CACHE_DIR_NAME).join("config.toml"))
    }

    /// Default cache directory for the current OS
    ///
    /// Lives next to the configuration to keep config and cache unified:
    /// - macOS: `~/Library/Application Support/ota-fetcher/cache`
    /// - Linux: `~/.config/ota-fetcher/cache`
    /// - Windows: `%APPDATA%/ota-fetcher/cache`
    pub fn default_cache_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CACHE_DIR_NAME).join("cache"))
    }

    /// Resolve the cache directory: flag, then config file, then OS default
    pub fn resolve_cache_dir(
        &self,
        flag: Option<&Path>,
    ) -> std::result::Result<PathBuf, ConfigError> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.distribution.cache_dir.clone())
            .or_else(Self::default_cache_dir)
            .ok_or_else(|| ConfigError::CacheRootNotDirectory {
                path: PathBuf::from("system config directory"),
            })
    }

    /// Resolve the distribution URL: flag, then config file, then the
    /// `OTA_DISTRIBUTION_URL` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingUrl` when no source provides one.
    pub fn resolve_url(&self, flag: Option<&str>) -> std::result::Result<String, ConfigError> {
        flag.map(str::to_string)
            .or_else(|| self.distribution.url.clone())
            .or_else(|| env::var(env_constants::DISTRIBUTION_URL).ok())
            .ok_or(ConfigError::MissingUrl)
    }

    /// Convert the TOML client section into the transport configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.client.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
            pool_idle_timeout: Duration::from_secs(self.client.pool_idle_timeout_secs),
            pool_max_per_host: self.client.pool_max_per_host,
            rate_limit_rps: self.client.rate_limit_rps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.distribution.concurrency, 16);
        assert!(config.distribution.url.is_none());
        assert_eq!(
            config.client.rate_limit_rps,
            limits::DEFAULT_RATE_LIMIT_RPS
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [distribution]
            url = "https://distributions.example.net/abc123/"
            concurrency = 4

            [client]
            request_timeout_secs = 10
            connect_timeout_secs = 5
            pool_idle_timeout_secs = 30
            pool_max_per_host = 2
            rate_limit_rps = 3
            "#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.distribution.url.as_deref(),
            Some("https://distributions.example.net/abc123/")
        );
        assert_eq!(config.distribution.concurrency, 4);
        assert_eq!(config.client.rate_limit_rps, 3);
        assert_eq!(config.client_config().request_timeout.as_secs(), 10);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[distribution").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_url_resolution_precedence() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.resolve_url(None),
            Err(ConfigError::MissingUrl)
        ));

        config.distribution.url = Some("https://from-config.example.net/".to_string());
        assert_eq!(
            config.resolve_url(None).unwrap(),
            "https://from-config.example.net/"
        );

        // A flag overrides the config file
        assert_eq!(
            config
                .resolve_url(Some("https://from-flag.example.net/"))
                .unwrap(),
            "https://from-flag.example.net/"
        );
    }

    #[test]
    fn test_cache_dir_resolution() {
        let config = AppConfig::default();
        let flag = PathBuf::from("/tmp/ota-cache");
        assert_eq!(config.resolve_cache_dir(Some(&flag)).unwrap(), flag);
    }
}
