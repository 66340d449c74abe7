//! Disabled-cache implementation of the contract.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::contract::Cache;
use crate::resolve::ProducerId;
use crate::ttl::Ttl;

/// A cache that never stores anything.
///
/// Drop-in disablement of caching without changing call sites: every read
/// misses, every write reports `false`, `delete` and `clear` succeed
/// vacuously, and `resolve` invokes its producer on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl Cache for NullCache {
    fn has(&self, _key: &str) -> bool {
        false
    }

    fn get<T: DeserializeOwned>(&self, _key: &str, default: T) -> T {
        default
    }

    fn set<T: Serialize>(&self, _key: &str, _value: &T, _ttl: Option<Ttl>) -> bool {
        false
    }

    fn delete(&self, _key: &str) -> bool {
        true
    }

    fn clear(&self) -> bool {
        true
    }

    fn get_multiple<T, I, K>(&self, keys: I, default: T) -> BTreeMap<String, T>
    where
        T: DeserializeOwned + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| (key.as_ref().to_string(), default.clone()))
            .collect()
    }

    fn set_multiple<T, I, K>(&self, _entries: I, _ttl: Option<Ttl>) -> bool
    where
        T: Serialize,
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
    {
        // No item can ever succeed.
        false
    }

    fn delete_multiple<I, K>(&self, _keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        false
    }

    fn resolve<T, F>(&self, _id: &ProducerId, producer: F, _ttl: Option<Ttl>) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        producer()
    }
}
