//! Persistent key/value cache that stores values as loadable file artifacts.
//!
//! Each entry is one self-contained artifact file carrying the encoded
//! value, an optional expiry deadline, and integrity metadata; expiry is
//! re-evaluated on every load. The cache is strictly a performance layer:
//! read failures degrade to misses, write failures to `false`, and the
//! memoizing [`resolve`](Cache::resolve) operation always returns its
//! producer's value even when persistence fails.

#![warn(missing_docs)]

mod artifact;
mod bytecode;
mod contract;
mod error;
mod key;
mod null;
mod resolve;
mod store;
mod ttl;

pub use artifact::ArtifactCodec;
pub use bytecode::{BytecodeCache, NoopBytecodeCache};
pub use contract::Cache;
pub use error::CacheError;
pub use key::{Digest, KeyMapper};
pub use null::NullCache;
pub use resolve::ProducerId;
pub use store::FileCache;
pub use ttl::Ttl;
