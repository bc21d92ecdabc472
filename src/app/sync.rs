//! Per-file download orchestration
//!
//! A `FileSync` owns everything one logical translation file needs: the
//! locale-to-URL map derived from the manifest, the disk cache rooted in a
//! folder named after the file's digest, and the refresh logic that
//! downloads stale or missing locales with bounded concurrency.
//!
//! Reads are served from disk and never block on the network; refreshes
//! tolerate partial failure, leaving failed locales at their previous
//! cache state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::app::cache::{CacheStatus, LocaleCache};
use crate::app::hash::Sha1Hash;
use crate::app::http::HttpClient;
use crate::app::manifest::Manifest;
use crate::app::pool::WorkerPool;
use crate::constants::manifest::VERSION_QUERY_PARAM;
use crate::constants::workers::DEFAULT_CONCURRENCY;
use crate::errors::{DownloadError, Result};

/// Outcome of one refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshStats {
    /// Locales that classified as needing a download
    pub needed: usize,
    /// Locales successfully downloaded and written to the cache
    pub downloaded: usize,
}

impl RefreshStats {
    /// Locales that stayed at their previous cache state
    pub fn failed(&self) -> usize {
        self.needed - self.downloaded
    }
}

/// Cache-and-sync handle for one logical translation file
#[derive(Debug)]
pub struct FileSync {
    file_name: String,
    file_index: usize,
    manifest: Arc<Manifest>,
    url_mapping: HashMap<String, String>,
    cache: Arc<LocaleCache>,
    http: Arc<HttpClient>,
    // Serializes public read and refresh entry points so a refresh in
    // progress and a read cannot interleave into a partial view
    lock: Mutex<()>,
}

impl FileSync {
    /// Create the sync handle for one manifest file entry
    ///
    /// Builds the locale-to-URL map (locales whose path array does not reach
    /// `file_index` are skipped with a warning), opens the cache folder at
    /// `{cache_root}/{sha1(file_name)}`, and runs one initial refresh pass
    /// over every locale that is missing, corrupted, or expired.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache folder cannot be created. Download
    /// failures during the initial refresh are not errors.
    pub async fn new(
        http: Arc<HttpClient>,
        manifest: Arc<Manifest>,
        endpoint: &Url,
        file_name: &str,
        file_index: usize,
        cache_root: &Path,
    ) -> Result<Self> {
        let mut url_mapping = HashMap::new();
        for locale in manifest.locales() {
            let paths = manifest.paths_for(locale).unwrap_or_default();
            match paths.get(file_index) {
                Some(path) => {
                    let url = locale_url(endpoint, path, manifest.timestamp());
                    url_mapping.insert(locale.to_string(), url);
                }
                None => {
                    warn!(
                        "Locale {} covers {} files, skipping {} (index {})",
                        locale,
                        paths.len(),
                        file_name,
                        file_index
                    );
                }
            }
        }

        let cache_folder = cache_root.join(Sha1Hash::of(file_name).to_hex());
        let cache = Arc::new(LocaleCache::open(cache_folder).await?);

        let sync = Self {
            file_name: file_name.to_string(),
            file_index,
            manifest,
            url_mapping,
            cache,
            http,
            lock: Mutex::new(()),
        };

        // Known-bad locales get one download attempt before construction
        // returns
        sync.refresh_locked(true, DEFAULT_CONCURRENCY).await?;
        Ok(sync)
    }

    /// The logical file name this handle serves
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Position of this file in the manifest file list
    pub fn file_index(&self) -> usize {
        self.file_index
    }

    /// Locale codes this file is available in
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.url_mapping.keys().map(String::as_str)
    }

    /// Download every locale that needs it, with bounded concurrency
    ///
    /// The need-set is every locale classified `NotCached` or `Invalid`,
    /// plus `Expired` locales when `include_expired` is set. Individual
    /// download failures are logged and leave that locale's cache state
    /// untouched; they never fail the refresh.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidWorkerCount` for `concurrency < 1`, before
    /// any download is attempted.
    pub async fn refresh(&self, include_expired: bool, concurrency: usize) -> Result<RefreshStats> {
        let _guard = self.lock.lock().await;
        self.refresh_locked(include_expired, concurrency).await
    }

    async fn refresh_locked(
        &self,
        include_expired: bool,
        concurrency: usize,
    ) -> Result<RefreshStats> {
        let pool = WorkerPool::new(concurrency)?;
        let timestamp = self.manifest.timestamp();

        let mut need_download = Vec::new();
        for locale in self.url_mapping.keys() {
            match self.cache.status(locale, timestamp).await {
                CacheStatus::NotCached | CacheStatus::Invalid => {
                    need_download.push(locale.clone());
                }
                CacheStatus::Expired if include_expired => need_download.push(locale.clone()),
                _ => {}
            }
        }

        info!(
            "Downloading translations for {} locales of {}",
            need_download.len(),
            self.file_name
        );

        let downloaded = Arc::new(AtomicUsize::new(0));
        let needed = need_download.len();
        for locale in need_download {
            let http = Arc::clone(&self.http);
            let cache = Arc::clone(&self.cache);
            let url = self.url_mapping[&locale].clone();
            let downloaded = Arc::clone(&downloaded);
            pool.submit(async move {
                if download_locale(&http, &cache, &locale, &url, timestamp)
                    .await
                    .is_ok()
                {
                    downloaded.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;
        }
        pool.join().await;

        Ok(RefreshStats {
            needed,
            downloaded: downloaded.load(Ordering::SeqCst),
        })
    }

    /// Download one locale immediately, propagating failures
    ///
    /// Unlike `refresh`, this is for callers that asked for a specific
    /// locale and want to know why it could not be fetched.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::UnknownLocale` if the manifest does not list
    /// the locale for this file, `DownloadError` on transport or status
    /// failures, and `CacheError` if the result cannot be persisted.
    pub async fn refresh_locale(&self, locale: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let url = self
            .url_mapping
            .get(locale)
            .ok_or_else(|| DownloadError::UnknownLocale {
                locale: locale.to_string(),
            })?;
        download_locale(
            &self.http,
            &self.cache,
            locale,
            url,
            self.manifest.timestamp(),
        )
        .await
    }

    /// Get cached translation content by canonical locale code
    ///
    /// Serves from disk, preferring a stale-but-present value over blocking
    /// on the network. Absent when the locale was never fetched or its
    /// cache entry is corrupted.
    pub async fn content(&self, locale: &str) -> Option<String> {
        let _guard = self.lock.lock().await;
        self.cache
            .read(locale, self.manifest.timestamp(), true)
            .await
    }

    /// Get cached translation content by aliased locale code
    ///
    /// Resolves `alias` to its canonical code under `scheme` first; codes
    /// without a configured mapping are used as-is.
    pub async fn content_by_alias(&self, scheme: &str, alias: &str) -> Option<String> {
        let canonical = self.manifest.mapping().canonical_for(alias, scheme);
        self.content(&canonical).await
    }
}

/// Fetch one locale file and write it through to the cache
async fn download_locale(
    http: &HttpClient,
    cache: &LocaleCache,
    locale: &str,
    url: &str,
    timestamp: i64,
) -> Result<()> {
    let response = match http.get(url).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to download translation for {}: {}", locale, e);
            return Err(DownloadError::Http(e).into());
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(
            "Failed to download translation for {}: HTTP {}",
            locale, status
        );
        return Err(DownloadError::ServerError {
            status: status.as_u16(),
        }
        .into());
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read translation body for {}: {}", locale, e);
            return Err(DownloadError::Http(e).into());
        }
    };

    cache.write(locale, &body, timestamp).await?;
    info!("Downloaded translation for {}", locale);
    Ok(())
}

/// Build the download URL for one locale path
fn locale_url(endpoint: &Url, path: &str, timestamp: i64) -> String {
    let base = endpoint.as_str().trim_end_matches('/');
    let separator = if path.starts_with('/') { "" } else { "/" };
    format!(
        "{}{}{}?{}={}",
        base, separator, path, VERSION_QUERY_PARAM, timestamp
    )
}
