//! Distribution manifest parsing and locale alias resolution
//!
//! The manifest is a versioned snapshot of remote state: a timestamp, the
//! ordered list of logical files, a per-locale table of relative paths
//! (positionally aligned with the file list), and an optional table mapping
//! canonical locale codes to codes in caller-defined naming schemes.
//!
//! The manifest is fetched once at client construction and treated as an
//! immutable value afterwards; staleness of cached locale files is detected
//! lazily by comparing recorded timestamps against the current manifest.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::app::http::HttpClient;
use crate::constants::manifest::MANIFEST_FILE_NAME;
use crate::errors::{ManifestError, ManifestResult};

/// Immutable snapshot of a published distribution
#[derive(Debug, Clone)]
pub struct Manifest {
    timestamp: i64,
    files: Vec<String>,
    content: HashMap<String, Vec<String>>,
    mapping: LanguageMapping,
}

/// Locale alias table, canonical code -> scheme name -> alias code
///
/// Entries preserve manifest key order so that reverse lookups resolve
/// ambiguous aliases to the first matching canonical code.
#[derive(Debug, Clone, Default)]
pub struct LanguageMapping {
    entries: Vec<(String, HashMap<String, String>)>,
}

impl LanguageMapping {
    /// Look up the alias for a canonical locale code under a naming scheme
    ///
    /// For example, with `"tr": {"locale": "tr-TR"}` in the manifest,
    /// `alias_for("tr", "locale")` returns `"tr-TR"`. Unconfigured codes and
    /// schemes degrade to the input unchanged, never an error.
    pub fn alias_for(&self, canonical: &str, scheme: &str) -> String {
        self.entries
            .iter()
            .find(|(code, _)| code == canonical)
            .and_then(|(_, schemes)| schemes.get(scheme))
            .cloned()
            .unwrap_or_else(|| canonical.to_string())
    }

    /// Look up the canonical locale code for an alias under a naming scheme
    ///
    /// Linear scan in manifest key order; the first entry whose alias under
    /// `scheme` equals `alias` wins. Falls back to the input unchanged.
    pub fn canonical_for(&self, alias: &str, scheme: &str) -> String {
        self.entries
            .iter()
            .find(|(_, schemes)| schemes.get(scheme).map(String::as_str) == Some(alias))
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| alias.to_string())
    }

    /// Number of canonical codes with configured aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no aliases are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Manifest {
    /// Fetch and parse the manifest from a distribution endpoint
    ///
    /// Issues one GET to `{endpoint}/manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Http` on transport failure,
    /// `ManifestError::Fetch` on a non-success status, and
    /// `ManifestError::Parse` on a structurally invalid body.
    pub async fn fetch(http: &HttpClient, endpoint: &Url) -> ManifestResult<Self> {
        let url = manifest_url(endpoint);
        debug!("Requesting distribution manifest: {}", url);

        let response = http.get(&url).await?;
        if !response.status().is_success() {
            return Err(ManifestError::Fetch {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        Self::parse(&body)
    }

    /// Parse a manifest JSON body
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` naming the structural violation:
    /// non-object root, missing or non-integer `timestamp`, missing or
    /// non-array `files`, non-object `content`, non-array per-locale path
    /// entries, or malformed `language_mapping` entries.
    pub fn parse(body: &str) -> ManifestResult<Self> {
        let root: Value = serde_json::from_str(body).map_err(|e| ManifestError::Parse {
            reason: e.to_string(),
        })?;

        let root = root.as_object().ok_or_else(|| ManifestError::Parse {
            reason: "root path must be a json object".to_string(),
        })?;

        let timestamp = root
            .get("timestamp")
            .and_then(Value::as_i64)
            .ok_or_else(|| ManifestError::Parse {
                reason: "the manifest field `timestamp` is missing or not an integer".to_string(),
            })?;

        let files = root
            .get("files")
            .and_then(Value::as_array)
            .ok_or_else(|| ManifestError::Parse {
                reason: "the manifest field `files` is not an array".to_string(),
            })?
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ManifestError::Parse {
                        reason: "one of the entries in `files` is not a string".to_string(),
                    })
            })
            .collect::<ManifestResult<Vec<_>>>()?;

        let content = Self::parse_content(root.get("content"))?;
        let mapping = Self::parse_mapping(root.get("language_mapping"))?;

        Ok(Self {
            timestamp,
            files,
            content,
            mapping,
        })
    }

    fn parse_content(value: Option<&Value>) -> ManifestResult<HashMap<String, Vec<String>>> {
        let object = value
            .and_then(Value::as_object)
            .ok_or_else(|| ManifestError::Parse {
                reason: "either the content field was not found or it is not an object"
                    .to_string(),
            })?;

        let mut content = HashMap::with_capacity(object.len());
        for (locale, paths) in object {
            let paths = paths.as_array().ok_or_else(|| ManifestError::Parse {
                reason: format!("the `content.{}` entry is not an array", locale),
            })?;
            let paths = paths
                .iter()
                .map(|path| {
                    path.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ManifestError::Parse {
                            reason: format!("a path under `content.{}` is not a string", locale),
                        })
                })
                .collect::<ManifestResult<Vec<_>>>()?;
            content.insert(locale.clone(), paths);
        }
        Ok(content)
    }

    fn parse_mapping(value: Option<&Value>) -> ManifestResult<LanguageMapping> {
        // Absence means no aliasing is configured
        let object = match value {
            None | Some(Value::Null) => return Ok(LanguageMapping::default()),
            Some(value) => value.as_object().ok_or_else(|| ManifestError::Parse {
                reason: "the manifest field `language_mapping` is not an object".to_string(),
            })?,
        };

        let mut entries = Vec::with_capacity(object.len());
        for (canonical, schemes) in object {
            let schemes = schemes.as_object().ok_or_else(|| ManifestError::Parse {
                reason: "one of the elements in language_mapping's value is not a json object"
                    .to_string(),
            })?;
            let mut scheme_map = HashMap::with_capacity(schemes.len());
            for (scheme, alias) in schemes {
                let alias = alias.as_str().ok_or_else(|| ManifestError::Parse {
                    reason: format!(
                        "the alias for `{}` under scheme `{}` is not a string",
                        canonical, scheme
                    ),
                })?;
                scheme_map.insert(scheme.clone(), alias.to_string());
            }
            entries.push((canonical.clone(), scheme_map));
        }
        Ok(LanguageMapping { entries })
    }

    /// The timestamp identifying this published snapshot
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Logical file names, in manifest order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Relative paths for one locale, positionally aligned with `files()`
    pub fn paths_for(&self, locale: &str) -> Option<&[String]> {
        self.content.get(locale).map(Vec::as_slice)
    }

    /// Locale codes declared in the manifest content table
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }

    /// The locale alias table
    pub fn mapping(&self) -> &LanguageMapping {
        &self.mapping
    }
}

/// Build the manifest URL for a distribution endpoint
fn manifest_url(endpoint: &Url) -> String {
    format!(
        "{}/{}",
        endpoint.as_str().trim_end_matches('/'),
        MANIFEST_FILE_NAME
    )
}
