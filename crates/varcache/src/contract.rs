//! The cache contract.
//!
//! Every conforming store — the file-backed [`FileCache`](crate::FileCache)
//! or the disabled-cache [`NullCache`](crate::NullCache) — is
//! interchangeable behind this trait. Read operations never fail past the
//! cache boundary: a missing, expired, or unreadable entry substitutes the
//! caller's default. Write operations report success as a boolean and
//! degrade to `false` on recoverable failures.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::resolve::ProducerId;
use crate::ttl::Ttl;

/// A persistent key/value cache with memoized computation.
///
/// Keys are non-empty caller-supplied strings. Batch operations are the
/// pointwise application of their single-key forms, with boolean results
/// combined by logical AND.
pub trait Cache {
    /// Returns `true` if an artifact exists for the key.
    ///
    /// Disregards TTL: a logically expired but not yet deleted artifact
    /// still reports `true`. This is an intentional asymmetry with
    /// [`get`](Self::get).
    fn has(&self, key: &str) -> bool;

    /// Returns the cached value, or `default` if the entry is absent,
    /// expired, or cannot be decoded.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T;

    /// Stores a value under the key, optionally expiring after the TTL.
    ///
    /// Returns `false` if the value cannot be encoded or the write fails;
    /// both are reported as warnings, never errors.
    fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Ttl>) -> bool;

    /// Removes the entry for the key.
    ///
    /// Returns `true` whether or not the entry existed; absence is not an
    /// error.
    fn delete(&self, key: &str) -> bool;

    /// Removes every artifact in the cache.
    ///
    /// Returns `true` if the cache directory does not exist (nothing to
    /// clear). All artifacts are processed even if some removals fail; the
    /// result is the AND of all removal outcomes.
    fn clear(&self) -> bool;

    /// Fetches several keys at once, substituting `default` per missing
    /// entry.
    fn get_multiple<T, I, K>(&self, keys: I, default: T) -> BTreeMap<String, T>
    where
        T: DeserializeOwned + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>;

    /// Stores several entries at once under one TTL.
    ///
    /// Entries are stored independently; a failure for one does not undo
    /// the others, only the aggregate boolean reflects it.
    fn set_multiple<T, I, K>(&self, entries: I, ttl: Option<Ttl>) -> bool
    where
        T: Serialize,
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>;

    /// Deletes several keys at once.
    fn delete_multiple<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>;

    /// Returns the memoized result of `producer`, computing it at most
    /// once per identity within the validity window.
    ///
    /// If a valid (non-expired) artifact exists for the identity, it is
    /// decoded and returned without invoking `producer`. Otherwise
    /// `producer` runs exactly once and its result is persisted
    /// best-effort: persistence failure is a warning and never prevents
    /// returning the freshly computed value.
    fn resolve<T, F>(&self, id: &ProducerId, producer: F, ttl: Option<Ttl>) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T;
}
