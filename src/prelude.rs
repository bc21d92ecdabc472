//! Prelude module for OTA Fetcher Library
//!
//! Re-exports the most commonly used items from the library, providing a
//! convenient way to import everything needed for typical usage with a
//! single `use ota_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ota_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = OtaClient::new(
//!         "https://distributions.example.net/91b97508fdf19626f2977b7/",
//!         "./cache",
//!     )
//!     .await?;
//!
//!     for name in client.list_files() {
//!         println!("{}", name);
//!     }
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components
pub use crate::app::{
    CacheStatus, ClientConfig, FileSync, HttpClient, LanguageMapping, LocaleCache, Manifest,
    OtaClient, RefreshStats, Sha1Hash, WorkerPool,
};

// Application configuration
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_CONCURRENCY, ENV_DISTRIBUTION_URL, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;
