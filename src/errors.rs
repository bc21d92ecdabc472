//! Error types for OTA Fetcher
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for
//! debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Cache root exists but is not a usable directory
    #[error("Cache root is not a directory: {path}")]
    CacheRootNotDirectory { path: PathBuf },

    /// Cache root could not be created
    #[error("Failed to create cache root: {path}")]
    CacheRootNotCreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid distribution URL
    #[error("Invalid distribution URL: {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Missing distribution URL (no flag, config entry, or environment variable)
    #[error("No distribution URL configured. Pass --url or set OTA_DISTRIBUTION_URL")]
    MissingUrl,

    /// Invalid configuration file format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// I/O error reading or writing the configuration file
    #[error("Configuration file I/O error")]
    Io(#[from] std::io::Error),
}

/// Manifest retrieval and parsing errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Transport failure during the manifest request
    #[error("Failed to request distribution manifest")]
    Http(#[from] reqwest::Error),

    /// Server answered the manifest request with a non-success status
    #[error("Failed to get distribution manifest: HTTP {status}")]
    Fetch { status: u16 },

    /// Structurally invalid manifest body
    #[error("Failed to parse distribution manifest: {reason}")]
    Parse { reason: String },
}

/// Locale file download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Locale not present in the manifest content for this file
    #[error("Unknown locale requested for download: {locale}")]
    UnknownLocale { locale: String },
}

/// Cache management errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory not found or inaccessible
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// Atomic write to the cache failed
    #[error("Failed to write cache file: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed fingerprint string in the metadata index
    #[error("Invalid fingerprint: {value}. Expected SHA-1 hex string")]
    InvalidFingerprint { value: String },
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum PoolError {
    /// Worker count must be at least one
    #[error("The worker count must be greater than 0, got {count}")]
    InvalidWorkerCount { count: usize },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Worker pool error
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Manifest(_) => "manifest",
            AppError::Download(_) => "download",
            AppError::Cache(_) => "cache",
            AppError::Pool(_) => "pool",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;
