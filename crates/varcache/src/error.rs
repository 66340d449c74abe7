//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while encoding, decoding, or storing artifacts.
///
/// Most cache operations are fail-safe: read-path errors result in cache
/// misses and write-path errors in a `false` return plus a logged warning,
/// never a hard failure. This enum is used for internal error propagation
/// within the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The value could not be encoded as a cache artifact.
    ///
    /// Raised for value kinds the serializer cannot represent, such as
    /// types wrapping live I/O handles.
    #[error("value cannot be encoded as a cache artifact: {reason}")]
    Encode {
        /// Description of the serializer failure.
        reason: String,
    },

    /// An I/O error occurred while reading, writing, or removing an
    /// artifact file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact carries a deadline that has passed.
    ///
    /// Distinct from decode failures so callers can tell a logically
    /// expired entry apart from a corrupt one.
    #[error("artifact expired at {expired_at} ms (now {now} ms)")]
    Expired {
        /// Embedded deadline, in unix milliseconds.
        expired_at: u64,
        /// Evaluation-time clock, in unix milliseconds.
        now: u64,
    },

    /// The artifact bytes are structurally invalid.
    ///
    /// Covers truncation, wrong magic bytes, format-version mismatches,
    /// and checksum mismatches.
    #[error("invalid cache artifact: {reason}")]
    InvalidArtifact {
        /// Description of the structural problem.
        reason: String,
    },

    /// The artifact payload could not be deserialized into the requested
    /// type.
    #[error("failed to decode cached value: {reason}")]
    Decode {
        /// Description of the deserializer failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_error_display() {
        let err = CacheError::Encode {
            reason: "cannot serialize file handle".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cannot be encoded"));
        assert!(msg.contains("file handle"));
    }

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/cache.abc.bin"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("cache.abc.bin"));
    }

    #[test]
    fn expired_display() {
        let err = CacheError::Expired {
            expired_at: 1000,
            now: 2000,
        };
        let msg = err.to_string();
        assert!(msg.contains("expired at 1000"));
        assert!(msg.contains("now 2000"));
    }

    #[test]
    fn invalid_artifact_display() {
        let err = CacheError::InvalidArtifact {
            reason: "bad magic bytes".to_string(),
        };
        assert!(err.to_string().contains("bad magic bytes"));
    }

    #[test]
    fn decode_error_display() {
        let err = CacheError::Decode {
            reason: "invalid bincode data".to_string(),
        };
        assert!(err.to_string().contains("invalid bincode data"));
    }
}
