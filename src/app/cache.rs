//! Disk-backed locale cache with integrity and freshness classification
//!
//! Each logical translation file owns one `LocaleCache`, rooted in its own
//! folder under the cache root. The folder holds one content file per locale
//! (file name = locale code, verbatim text) plus a `memory.json` metadata
//! index recording, for every locale, the manifest timestamp and content
//! fingerprint at the time of the last successful write.
//!
//! Classification is the single source of truth for refresh decisions:
//! a locale is re-downloaded when it is missing, corrupted, or recorded
//! against an older manifest than the current one.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::app::hash::Sha1Hash;
use crate::constants::cache::{MEMORY_FILE_NAME, TEMP_FILE_SUFFIX};
use crate::errors::{CacheError, CacheResult};

/// Classification of one cached locale entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No metadata entry exists for the locale
    NotCached,
    /// The content file is missing, unreadable, or fails the fingerprint check
    Invalid,
    /// Content is consistent but recorded against an older manifest
    Expired,
    /// Content is consistent and current
    Valid,
}

/// Metadata recorded per locale at the time of the last successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Manifest timestamp in effect when the entry was written
    pub timestamp: i64,
    /// SHA-1 fingerprint of the content at write time
    pub sha1: Sha1Hash,
}

/// Per-file, disk-backed store of one entry per locale code
#[derive(Debug)]
pub struct LocaleCache {
    root: PathBuf,
    memory_file: PathBuf,
    memory: tokio::sync::RwLock<HashMap<String, CacheRecord>>,
}

impl LocaleCache {
    /// Open a cache rooted at the given folder, creating it if necessary
    ///
    /// The metadata index is loaded eagerly. A missing index file yields an
    /// empty index; an unparsable one is logged and discarded, never a
    /// construction failure.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::DirectoryNotAccessible` if the folder cannot be
    /// created or is not a directory.
    pub async fn open(root: PathBuf) -> CacheResult<Self> {
        match fs::metadata(&root).await {
            Ok(meta) if !meta.is_dir() => {
                return Err(CacheError::DirectoryNotAccessible { path: root });
            }
            Ok(_) => {}
            Err(_) => {
                fs::create_dir_all(&root).await.map_err(|e| {
                    warn!("Failed to create cache folder {}: {}", root.display(), e);
                    CacheError::DirectoryNotAccessible { path: root.clone() }
                })?;
            }
        }

        let memory_file = root.join(MEMORY_FILE_NAME);
        let memory = Self::load_memory(&memory_file).await;

        Ok(Self {
            root,
            memory_file,
            memory: tokio::sync::RwLock::new(memory),
        })
    }

    /// The folder this cache is rooted at
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify one locale against the current manifest timestamp
    ///
    /// Pure classification with no side effects; does not touch the network.
    pub async fn status(&self, locale: &str, current_timestamp: i64) -> CacheStatus {
        let record = {
            let memory = self.memory.read().await;
            match memory.get(locale) {
                Some(record) => *record,
                None => return CacheStatus::NotCached,
            }
        };

        let content = match self.load_content(locale).await {
            Some(content) => content,
            None => return CacheStatus::Invalid,
        };

        if Sha1Hash::of(&content) != record.sha1 {
            return CacheStatus::Invalid;
        }
        if record.timestamp < current_timestamp {
            return CacheStatus::Expired;
        }
        CacheStatus::Valid
    }

    /// Read cached content for one locale
    ///
    /// Returns the content only when the entry classifies as `Valid`, or as
    /// `Expired` while `allow_expired` is set. `NotCached` and `Invalid`
    /// entries are absent unconditionally. Reads never fail with an error.
    pub async fn read(
        &self,
        locale: &str,
        current_timestamp: i64,
        allow_expired: bool,
    ) -> Option<String> {
        match self.status(locale, current_timestamp).await {
            CacheStatus::Valid => self.load_content(locale).await,
            CacheStatus::Expired if allow_expired => self.load_content(locale).await,
            _ => None,
        }
    }

    /// Write content for one locale and update the metadata index
    ///
    /// The content file is replaced atomically (temp file + rename), then the
    /// index entry is swapped and the full index rewritten to disk. Readers
    /// of other locales are unaffected; readers of the same locale observe
    /// either the old or the new complete entry.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::WriteFailed` if the content or index file cannot
    /// be persisted.
    pub async fn write(&self, locale: &str, content: &str, timestamp: i64) -> CacheResult<()> {
        let path = self.root.join(locale);
        write_atomic(&path, content.as_bytes()).await?;

        let record = CacheRecord {
            timestamp,
            sha1: Sha1Hash::of(content),
        };

        // Hold the write lock across the index rewrite so the on-disk index
        // always reflects the last successful write
        let mut memory = self.memory.write().await;
        memory.insert(locale.to_string(), record);
        let encoded = serde_json::to_vec_pretty(&*memory)
            .expect("cache index serialization cannot fail");
        write_atomic(&self.memory_file, &encoded).await?;

        debug!(
            "Cached locale {} at {} ({})",
            locale,
            self.root.display(),
            record.sha1
        );
        Ok(())
    }

    /// Load the content file for a locale, absent on any read failure
    async fn load_content(&self, locale: &str) -> Option<String> {
        match fs::read_to_string(self.root.join(locale)).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Cache file for {} not readable: {}", locale, e);
                None
            }
        }
    }

    /// Load the metadata index, falling back to empty on any failure
    async fn load_memory(memory_file: &Path) -> HashMap<String, CacheRecord> {
        let raw = match fs::read_to_string(memory_file).await {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(), // Not created yet
        };
        match serde_json::from_str(&raw) {
            Ok(memory) => memory,
            Err(e) => {
                warn!(
                    "Failed to load cache memory from {}: {}",
                    memory_file.display(),
                    e
                );
                HashMap::new()
            }
        }
    }
}

/// Write bytes to a path atomically via a sibling temp file and rename
async fn write_atomic(path: &Path, bytes: &[u8]) -> CacheResult<()> {
    let mut temp_name = OsString::from(path.as_os_str());
    temp_name.push(TEMP_FILE_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    let map_err = |source: std::io::Error| CacheError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&temp_path, bytes).await.map_err(map_err)?;
    fs::rename(&temp_path, path).await.map_err(map_err)?;
    Ok(())
}
