//! Core distribution cache engine
//!
//! This module contains the main application components: the HTTP transport,
//! manifest parsing and alias resolution, the per-locale disk cache, the
//! bounded download worker pool, and the per-file sync orchestration.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ota_fetcher::app::OtaClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OtaClient::new(
//!     "https://distributions.example.net/91b97508fdf19626f2977b7/",
//!     "./cache",
//! )
//! .await?;
//!
//! for name in client.list_files() {
//!     println!("Available file: {}", name);
//! }
//!
//! if let Some(file) = client.file("/content/main.yml") {
//!     if let Some(content) = file.content_by_alias("locale", "tr-TR").await {
//!         println!("{}", content);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod hash;
pub mod http;
pub mod manifest;
pub mod pool;
pub mod sync;

// Re-export main public API
pub use cache::{CacheRecord, CacheStatus, LocaleCache};
pub use client::OtaClient;
pub use hash::Sha1Hash;
pub use http::{ClientConfig, HttpClient};
pub use manifest::{LanguageMapping, Manifest};
pub use pool::WorkerPool;
pub use sync::{FileSync, RefreshStats};
