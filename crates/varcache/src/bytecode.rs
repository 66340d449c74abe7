//! Bridge to the host's optional bytecode cache.
//!
//! Some host runtimes keep compiled representations of loadable files in
//! memory. When an artifact file is overwritten or removed, that copy must
//! be invalidated or readers would observe stale values. The bridge is an
//! injected capability with a no-op default, so the cache stays testable
//! and usable when the subsystem is absent.

use std::path::Path;

/// Best-effort interface to a host bytecode cache.
///
/// Both operations are queries/commands against an optional subsystem:
/// when it is unavailable they report `false`, which means "nothing to
/// do", not an error.
pub trait BytecodeCache: Send + Sync {
    /// Returns `true` if the host holds a loadable compiled copy of the
    /// file.
    ///
    /// A positive answer is treated as equivalent to file existence by
    /// `has` and `get`; this is a performance optimization, not a
    /// correctness requirement.
    fn is_script_cached(&self, path: &Path) -> bool;

    /// Drops the compiled copy of the file, if any.
    ///
    /// With `force` the copy is discarded even if the host still considers
    /// it current. Returns `true` if a copy was invalidated.
    fn invalidate(&self, path: &Path, force: bool) -> bool;
}

/// Bridge used when no bytecode-caching subsystem is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBytecodeCache;

impl BytecodeCache for NoopBytecodeCache {
    fn is_script_cached(&self, _path: &Path) -> bool {
        false
    }

    fn invalidate(&self, _path: &Path, _force: bool) -> bool {
        false
    }
}
