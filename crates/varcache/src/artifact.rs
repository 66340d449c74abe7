//! Artifact encoding and decoding.
//!
//! Each cache entry is one self-contained artifact file: a binary header
//! (magic bytes, format version, optional expiry deadline, payload
//! checksum) followed by the bincode-encoded value. The expiry deadline
//! travels inside the artifact and is re-checked on every decode, so TTL
//! correctness never depends on a sidecar metadata file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::key::Digest;

/// Magic bytes identifying a varcache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"VCAC";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every artifact for validation.
///
/// Contains magic bytes to identify the file format, a version number for
/// compatibility checks, the optional expiry deadline, and a checksum to
/// detect payload corruption.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactHeader {
    /// Magic bytes: must be `b"VCAC"`.
    magic: [u8; 4],

    /// Artifact format version.
    format_version: u32,

    /// Absolute expiry deadline in unix milliseconds, if any.
    expires_at: Option<u64>,

    /// Digest of the payload bytes (for integrity checks).
    checksum: Digest,
}

/// Encodes values into artifact bytes and decodes them back, applying
/// expiry at decode time.
///
/// Encoding never partially writes: it returns the complete artifact
/// bytes or an error, and callers persist them as a whole file.
pub struct ArtifactCodec;

impl ArtifactCodec {
    /// Encodes a value plus optional expiry deadline into artifact bytes.
    ///
    /// Fails with [`CacheError::Encode`] when the value is not
    /// representable, e.g. a type whose `Serialize` impl refuses (live
    /// handles, unserializable resources).
    pub fn encode<T: Serialize>(
        value: &T,
        expires_at: Option<u64>,
    ) -> Result<Vec<u8>, CacheError> {
        let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| CacheError::Encode {
                reason: e.to_string(),
            })?;

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            expires_at,
            checksum: Digest::of(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Encode {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);

        Ok(output)
    }

    /// Decodes artifact bytes back into a value, validating the header.
    ///
    /// Returns [`CacheError::Expired`] if the artifact carries a deadline
    /// and `now` is at or past it; the check runs on every decode, before
    /// the payload is deserialized. Structural problems (truncation, wrong
    /// magic, version mismatch, checksum mismatch) yield
    /// [`CacheError::InvalidArtifact`] and payload deserialization
    /// failures yield [`CacheError::Decode`] — callers treat all of these
    /// as cache misses.
    pub fn decode<T: DeserializeOwned>(bytes: &[u8], now: u64) -> Result<T, CacheError> {
        if bytes.len() < 4 {
            return Err(CacheError::InvalidArtifact {
                reason: "truncated before header length".to_string(),
            });
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&bytes[..4]);
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        if bytes.len() < 4 + header_len {
            return Err(CacheError::InvalidArtifact {
                reason: "truncated header".to_string(),
            });
        }

        let header: ArtifactHeader = bincode::serde::decode_from_slice(
            &bytes[4..4 + header_len],
            bincode::config::standard(),
        )
        .map_err(|e| CacheError::InvalidArtifact {
            reason: format!("unreadable header: {e}"),
        })?
        .0;

        if header.magic != ARTIFACT_MAGIC {
            return Err(CacheError::InvalidArtifact {
                reason: "wrong magic bytes".to_string(),
            });
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CacheError::InvalidArtifact {
                reason: format!(
                    "format version {} (expected {ARTIFACT_FORMAT_VERSION})",
                    header.format_version
                ),
            });
        }

        let payload = &bytes[4 + header_len..];
        if Digest::of(payload) != header.checksum {
            return Err(CacheError::InvalidArtifact {
                reason: "checksum mismatch".to_string(),
            });
        }

        if let Some(expired_at) = header.expires_at {
            if now >= expired_at {
                return Err(CacheError::Expired { expired_at, now });
            }
        }

        let value = bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| CacheError::Decode {
                reason: e.to_string(),
            })?
            .0;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in for a value kind that cannot be cached, e.g. a live
    /// resource handle.
    struct Unsupported;

    impl Serialize for Unsupported {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("live I/O handle"))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
        tags: Vec<String>,
    }

    fn sample() -> Record {
        Record {
            name: "example".to_string(),
            count: 7,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn roundtrip_without_expiry() {
        let bytes = ArtifactCodec::encode(&sample(), None).unwrap();
        let back: Record = ArtifactCodec::decode(&bytes, u64::MAX).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn roundtrip_with_future_expiry() {
        let bytes = ArtifactCodec::encode(&sample(), Some(10_000)).unwrap();
        let back: Record = ArtifactCodec::decode(&bytes, 9_999).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn expired_at_deadline() {
        let bytes = ArtifactCodec::encode(&42u32, Some(10_000)).unwrap();
        let err = ArtifactCodec::decode::<u32>(&bytes, 10_000).unwrap_err();
        assert!(matches!(
            err,
            CacheError::Expired {
                expired_at: 10_000,
                now: 10_000
            }
        ));
    }

    #[test]
    fn expired_past_deadline() {
        let bytes = ArtifactCodec::encode(&42u32, Some(1_000)).unwrap();
        let err = ArtifactCodec::decode::<u32>(&bytes, 2_000).unwrap_err();
        assert!(matches!(err, CacheError::Expired { .. }));
    }

    #[test]
    fn no_expiry_never_expires() {
        let bytes = ArtifactCodec::encode(&42u32, None).unwrap();
        let back: u32 = ArtifactCodec::decode(&bytes, u64::MAX).unwrap();
        assert_eq!(back, 42);
    }

    #[test]
    fn encode_unsupported_value_fails() {
        let err = ArtifactCodec::encode(&Unsupported, None).unwrap_err();
        assert!(matches!(err, CacheError::Encode { .. }));
        assert!(err.to_string().contains("live I/O handle"));
    }

    #[test]
    fn decode_truncated_fails() {
        let err = ArtifactCodec::decode::<u32>(b"AB", 0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArtifact { .. }));
    }

    #[test]
    fn decode_truncated_header_fails() {
        // Header length claims more bytes than present
        let mut bytes = vec![];
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(b"short");
        let err = ArtifactCodec::decode::<u32>(&bytes, 0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArtifact { .. }));
    }

    #[test]
    fn decode_wrong_magic_fails() {
        let payload = bincode::serde::encode_to_vec(&1u32, bincode::config::standard()).unwrap();
        let header = ArtifactHeader {
            magic: *b"BAAD",
            format_version: ARTIFACT_FORMAT_VERSION,
            expires_at: None,
            checksum: Digest::of(&payload),
        };
        let header_bytes =
            bincode::serde::encode_to_vec(&header, bincode::config::standard()).unwrap();
        let mut bytes = vec![];
        bytes.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&header_bytes);
        bytes.extend_from_slice(&payload);

        let err = ArtifactCodec::decode::<u32>(&bytes, 0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArtifact { .. }));
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn decode_wrong_version_fails() {
        let payload = bincode::serde::encode_to_vec(&1u32, bincode::config::standard()).unwrap();
        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: 999,
            expires_at: None,
            checksum: Digest::of(&payload),
        };
        let header_bytes =
            bincode::serde::encode_to_vec(&header, bincode::config::standard()).unwrap();
        let mut bytes = vec![];
        bytes.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&header_bytes);
        bytes.extend_from_slice(&payload);

        let err = ArtifactCodec::decode::<u32>(&bytes, 0).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn decode_tampered_payload_fails_checksum() {
        let mut bytes = ArtifactCodec::encode(&sample(), None).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let err = ArtifactCodec::decode::<Record>(&bytes, 0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArtifact { .. }));
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn decode_garbage_fails() {
        let err = ArtifactCodec::decode::<u32>(b"complete garbage, not an artifact", 0)
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidArtifact { .. }));
    }

    #[test]
    fn decode_wrong_type_fails() {
        let bytes = ArtifactCodec::encode(&sample(), None).unwrap();
        // Record payload cannot deserialize as a bare u64 sequence
        let err = ArtifactCodec::decode::<Vec<u64>>(&bytes, 0).unwrap_err();
        assert!(matches!(err, CacheError::Decode { .. }));
    }

    #[test]
    fn expiry_checked_before_payload_decode() {
        // Requesting the wrong type from an expired artifact reports
        // Expired, not Decode: the deadline is decided from the header.
        let bytes = ArtifactCodec::encode(&sample(), Some(1)).unwrap();
        let err = ArtifactCodec::decode::<Vec<u64>>(&bytes, 2).unwrap_err();
        assert!(matches!(err, CacheError::Expired { .. }));
    }
}
