//! File-backed cache store.
//!
//! `FileCache` orchestrates the key mapper, artifact codec, and bytecode
//! bridge into the full cache contract. It owns the cache directory path
//! but never the artifact files themselves: every operation re-observes
//! the current filesystem state, so concurrent writers race at the
//! filesystem's last-write-wins semantics and readers see either the old
//! or the new artifact, never a torn one. Artifacts are written via a
//! temporary file in the cache directory followed by a rename; whole-file
//! atomic replace is a requirement on the deployed filesystem.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::artifact::ArtifactCodec;
use crate::bytecode::{BytecodeCache, NoopBytecodeCache};
use crate::contract::Cache;
use crate::error::CacheError;
use crate::key::KeyMapper;
use crate::resolve::ProducerId;
use crate::ttl::{now_millis, Ttl};

/// Persistent cache storing each value as one artifact file.
///
/// All operations are synchronous and perform blocking filesystem I/O on
/// the caller's thread. No state is cached in memory between calls. A
/// missing cache directory is a valid steady state: reads behave as an
/// empty cache and only writes report it as a failure.
pub struct FileCache {
    /// Key-to-path mapping for the owned cache directory.
    mapper: KeyMapper,

    /// Bridge to the host's optional bytecode cache.
    bytecode: Arc<dyn BytecodeCache>,
}

impl FileCache {
    /// Creates a cache over the given directory with no bytecode-cache
    /// coordination.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_bytecode_cache(dir, Arc::new(NoopBytecodeCache))
    }

    /// Creates a cache that keeps the given bytecode cache consistent
    /// with artifact files as they are overwritten and removed.
    pub fn with_bytecode_cache(dir: impl Into<PathBuf>, bytecode: Arc<dyn BytecodeCache>) -> Self {
        Self {
            mapper: KeyMapper::new(dir),
            bytecode,
        }
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        self.mapper.dir()
    }

    /// Reads and decodes the artifact at `path`, applying expiry at the
    /// current clock.
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CacheError> {
        let bytes = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        ArtifactCodec::decode(&bytes, now_millis())
    }

    /// Encodes and writes an artifact for `key`, reporting recoverable
    /// failures as warnings.
    fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Ttl>) -> bool {
        let expires_at = ttl.map(|t| t.deadline_millis(now_millis()));

        let bytes = match ArtifactCodec::encode(value, expires_at) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(target: "varcache", key, error = %err, "failed to cache value");
                return false;
            }
        };

        let path = self.mapper.file_for(key);
        if let Err(err) = write_atomic(&path, &bytes) {
            tracing::warn!(target: "varcache", key, error = %err, "failed to write cache artifact");
            return false;
        }

        // Drop any stale compiled copy of the overwritten file.
        self.bytecode.invalidate(&path, true);
        true
    }

    /// Invalidates and removes every artifact-named path in `entries`,
    /// folding per-entry enumeration errors into the result.
    ///
    /// All entries are processed even after a failure; the return value is
    /// the AND of all outcomes.
    fn remove_artifacts(
        &self,
        entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
    ) -> bool {
        let mut success = true;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!(
                        target: "varcache",
                        dir = %self.mapper.dir().display(),
                        error = %err,
                        "failed to enumerate cache directory"
                    );
                    success = false;
                    continue;
                }
            };

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !KeyMapper::is_artifact_name(name) {
                continue;
            }

            self.bytecode.invalidate(&path, true);
            let removed = match std::fs::remove_file(&path) {
                Ok(()) => true,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
                Err(err) => {
                    tracing::warn!(
                        target: "varcache",
                        path = %path.display(),
                        error = %err,
                        "failed to remove cache artifact"
                    );
                    false
                }
            };
            success = success && removed;
        }

        success
    }
}

impl Cache for FileCache {
    fn has(&self, key: &str) -> bool {
        let path = self.mapper.file_for(key);
        self.bytecode.is_script_cached(&path) || path.exists()
    }

    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.mapper.file_for(key);
        if !self.bytecode.is_script_cached(&path) && !path.exists() {
            return default;
        }

        match self.load(&path) {
            Ok(value) => value,
            Err(err) => {
                // Expired or unreadable entries are ordinary misses.
                tracing::debug!(target: "varcache", key, error = %err, "cache miss");
                default
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Ttl>) -> bool {
        self.store(key, value, ttl)
    }

    fn delete(&self, key: &str) -> bool {
        let path = self.mapper.file_for(key);
        self.bytecode.invalidate(&path, true);

        match std::fs::remove_file(&path) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => {
                tracing::warn!(target: "varcache", key, error = %err, "failed to remove cache artifact");
                false
            }
        }
    }

    fn clear(&self) -> bool {
        let dir = self.mapper.dir();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return true,
            Err(err) => {
                tracing::warn!(
                    target: "varcache",
                    dir = %dir.display(),
                    error = %err,
                    "failed to enumerate cache directory"
                );
                return false;
            }
        };

        self.remove_artifacts(entries.map(|entry| entry.map(|e| e.path())))
    }

    fn get_multiple<T, I, K>(&self, keys: I, default: T) -> BTreeMap<String, T>
    where
        T: DeserializeOwned + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| {
                let key = key.as_ref();
                (key.to_string(), self.get(key, default.clone()))
            })
            .collect()
    }

    fn set_multiple<T, I, K>(&self, entries: I, ttl: Option<Ttl>) -> bool
    where
        T: Serialize,
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
    {
        entries
            .into_iter()
            .fold(true, |success, (key, value)| {
                self.set(key.as_ref(), &value, ttl) && success
            })
    }

    fn delete_multiple<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .fold(true, |success, key| self.delete(key.as_ref()) && success)
    }

    fn resolve<T, F>(&self, id: &ProducerId, producer: F, ttl: Option<Ttl>) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let key = id.cache_key();
        let path = self.mapper.file_for(&key);

        if self.bytecode.is_script_cached(&path) || path.exists() {
            match self.load(&path) {
                Ok(value) => return value,
                Err(err) => {
                    // Expired or unreadable: recompute below.
                    tracing::debug!(target: "varcache", key, error = %err, "resolve cache miss");
                }
            }
        }

        let value = producer();

        // Persistence is strictly a performance layer; the fresh value is
        // returned regardless, and `store` has already warned on failure.
        self.store(&key, &value, ttl);

        value
    }
}

/// Writes `bytes` to `path` via a temporary file in the same directory
/// followed by a rename, so readers never observe a partial artifact.
///
/// Does not create the directory: a missing cache directory is a
/// recoverable write failure, not something the cache provisions.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    tmp.write_all(bytes).map_err(|e| CacheError::Io {
        path: tmp.path().to_path_buf(),
        source: e,
    })?;
    tmp.persist(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
