//! Key-to-filename mapping.
//!
//! Cache keys are arbitrary caller-supplied strings and must never appear
//! in a path directly. Each key is hashed with XXH3-128 and the hex digest
//! embedded in the artifact filename, so any key maps to a filesystem-safe
//! name. Resolve-derived keys share the same namespace and hash space.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Filename prefix for every artifact in a cache directory.
const ARTIFACT_PREFIX: &str = "cache.";

/// Filename extension for every artifact in a cache directory.
const ARTIFACT_EXT: &str = "bin";

/// A 128-bit XXH3 digest used for key-to-filename mapping and payload
/// checksums.
///
/// Two keys with the same `Digest` map to the same artifact file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest([u8; 16]);

impl Digest {
    /// Computes the digest of a byte slice using XXH3-128.
    pub fn of(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Maps cache keys to artifact file paths within one cache directory.
///
/// Deterministic and pure: no I/O is performed. The artifact for a key
/// lives at `<dir>/cache.<32-hex-digest>.bin`, one flat directory per
/// cache instance.
#[derive(Debug, Clone)]
pub struct KeyMapper {
    /// The cache directory all artifact paths are rooted in.
    dir: PathBuf,
}

impl KeyMapper {
    /// Creates a mapper rooted at the given cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the cache directory this mapper is rooted in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the artifact file path for a key.
    pub fn file_for(&self, key: &str) -> PathBuf {
        let digest = Digest::of(key.as_bytes());
        self.dir
            .join(format!("{ARTIFACT_PREFIX}{digest}.{ARTIFACT_EXT}"))
    }

    /// Returns `true` if a filename matches the artifact naming pattern.
    ///
    /// Used by `clear` to act only on files this cache owns, leaving
    /// unrelated files in the directory untouched.
    pub fn is_artifact_name(name: &str) -> bool {
        let Some(rest) = name.strip_prefix(ARTIFACT_PREFIX) else {
            return false;
        };
        let Some(digest) = rest.strip_suffix(&format!(".{ARTIFACT_EXT}")) else {
            return false;
        };
        digest.len() == 32 && digest.chars().all(|c| c.is_ascii_hexdigit())
    }
}
