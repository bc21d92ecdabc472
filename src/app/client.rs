//! Top-level distribution client
//!
//! `OtaClient` owns one manifest snapshot, the locale alias resolution used
//! by every file under it, and a registry mapping logical file names to
//! their `FileSync` handles. Construction validates the cache root, fetches
//! the manifest once, and builds one handle per manifest file entry in
//! index order; each handle performs its initial refresh pass before
//! construction returns.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::app::http::{ClientConfig, HttpClient};
use crate::app::manifest::Manifest;
use crate::app::sync::FileSync;
use crate::errors::{ConfigError, Result};

/// Client for one translation distribution
#[derive(Debug)]
pub struct OtaClient {
    endpoint: Url,
    cache_root: PathBuf,
    http: Arc<HttpClient>,
    manifest: Arc<Manifest>,
    files: HashMap<String, FileSync>,
}

impl OtaClient {
    /// Create a client from a distribution URL
    ///
    /// # Arguments
    ///
    /// * `distribution_url` - The distribution endpoint.
    ///   Example: `https://distributions.example.net/91b97508fdf19626f2977b7/`
    /// * `cache_root` - The folder to put cache files under
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unusable URL or cache root,
    /// `ManifestError::Fetch`/`Http` when the manifest request fails, and
    /// `ManifestError::Parse` for a structurally invalid manifest.
    pub async fn new(distribution_url: &str, cache_root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(distribution_url, cache_root, ClientConfig::default()).await
    }

    /// Create a client with custom HTTP transport configuration
    ///
    /// # Errors
    ///
    /// Same as [`OtaClient::new`].
    pub async fn with_config(
        distribution_url: &str,
        cache_root: impl Into<PathBuf>,
        config: ClientConfig,
    ) -> Result<Self> {
        let endpoint = Url::parse(distribution_url).map_err(|e| ConfigError::InvalidUrl {
            url: distribution_url.to_string(),
            source: e,
        })?;

        let cache_root = cache_root.into();
        init_cache_root(&cache_root).await?;

        let http = Arc::new(HttpClient::with_config(config)?);
        let manifest = Arc::new(Manifest::fetch(&http, &endpoint).await?);
        info!(
            "Loaded distribution manifest: timestamp {}, {} files, {} locales",
            manifest.timestamp(),
            manifest.files().len(),
            manifest.locales().count()
        );

        let files = build_registry(&http, &manifest, &endpoint, &cache_root).await?;

        Ok(Self {
            endpoint,
            cache_root,
            http,
            manifest,
            files,
        })
    }

    /// The timestamp of the current manifest snapshot
    pub fn timestamp(&self) -> i64 {
        self.manifest.timestamp()
    }

    /// The current manifest snapshot
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Logical file names declared by the distribution, in manifest order
    pub fn list_files(&self) -> &[String] {
        self.manifest.files()
    }

    /// Get the sync handle for one logical file
    pub fn file(&self, name: &str) -> Option<&FileSync> {
        self.files.get(name)
    }

    /// Map a canonical locale code to its alias under a naming scheme
    ///
    /// For example, with `"tr": {"locale": "tr-TR"}` configured,
    /// `alias_for("tr", "locale")` returns `"tr-TR"`. Codes without a
    /// mapping are returned unchanged.
    pub fn alias_for(&self, canonical: &str, scheme: &str) -> String {
        self.manifest.mapping().alias_for(canonical, scheme)
    }

    /// Map an aliased locale code back to its canonical code
    ///
    /// The reverse of [`OtaClient::alias_for`]; unmapped codes are returned
    /// unchanged.
    pub fn canonical_for(&self, alias: &str, scheme: &str) -> String {
        self.manifest.mapping().canonical_for(alias, scheme)
    }

    /// Re-fetch the manifest and rebuild the file registry
    ///
    /// Existing cache entries are untouched; entries written under an older
    /// manifest are detected lazily as expired by the rebuilt handles,
    /// which re-download them during their initial refresh pass.
    ///
    /// # Errors
    ///
    /// Same failure modes as construction, except cache root validation.
    pub async fn refresh_manifest(&mut self) -> Result<()> {
        let manifest = Arc::new(Manifest::fetch(&self.http, &self.endpoint).await?);
        debug!(
            "Refreshed manifest: timestamp {} -> {}",
            self.manifest.timestamp(),
            manifest.timestamp()
        );

        self.files = build_registry(&self.http, &manifest, &self.endpoint, &self.cache_root).await?;
        self.manifest = manifest;
        Ok(())
    }
}

/// Build one `FileSync` per manifest file entry, in index order
async fn build_registry(
    http: &Arc<HttpClient>,
    manifest: &Arc<Manifest>,
    endpoint: &Url,
    cache_root: &Path,
) -> Result<HashMap<String, FileSync>> {
    let mut files = HashMap::with_capacity(manifest.files().len());
    for (index, name) in manifest.files().iter().enumerate() {
        let sync = FileSync::new(
            Arc::clone(http),
            Arc::clone(manifest),
            endpoint,
            name,
            index,
            cache_root,
        )
        .await?;
        files.insert(name.clone(), sync);
    }
    Ok(files)
}

/// Validate the cache root, creating it if missing
async fn init_cache_root(path: &Path) -> std::result::Result<(), ConfigError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::CacheRootNotDirectory {
            path: path.to_path_buf(),
        }),
        Err(_) => fs::create_dir_all(path)
            .await
            .map_err(|e| ConfigError::CacheRootNotCreatable {
                path: path.to_path_buf(),
                source: e,
            }),
    }
}
