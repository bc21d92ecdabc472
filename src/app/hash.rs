//! SHA-1 fingerprint type for cache integrity checking
//!
//! This module provides a compact SHA-1 digest type that stores hashes as
//! 20-byte arrays instead of hex strings, giving cheap equality comparison
//! in the cache index while remaining hex-encoded on disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::errors::{CacheError, CacheResult};

/// SHA-1 digest stored as its raw 20-byte representation
///
/// Used as the content fingerprint for cached locale files and for deriving
/// per-file cache directory names. Serializes transparently as a lowercase
/// 40-character hex string for JSON compatibility with the metadata index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Hash([u8; 20]);

impl Sha1Hash {
    /// Compute the SHA-1 digest of a UTF-8 string
    ///
    /// Deterministic: identical input text always yields identical
    /// fingerprint bytes.
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(content.as_bytes());
        Sha1Hash(hasher.finalize().into())
    }

    /// Create a SHA-1 hash from a hex string
    ///
    /// # Arguments
    ///
    /// * `hex` - 40-character hexadecimal string (case insensitive)
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidFingerprint` if the string is not a valid
    /// SHA-1 hex representation
    pub fn from_hex(hex: &str) -> CacheResult<Self> {
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CacheError::InvalidFingerprint {
                value: hex.to_string(),
            });
        }

        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hex_pair = std::str::from_utf8(chunk).unwrap(); // Safe: validated above
            bytes[i] = u8::from_str_radix(hex_pair, 16).unwrap(); // Safe: validated above
        }

        Ok(Sha1Hash(bytes))
    }

    /// Convert the hash to a lowercase 40-character hex string
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(40), |mut acc, b| {
            write!(&mut acc, "{:02x}", b).unwrap();
            acc
        })
    }

    /// Get the raw byte array representation
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Sha1Hash {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Transparent serialization - serialize as hex string for JSON compatibility
impl Serialize for Sha1Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha1Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}
