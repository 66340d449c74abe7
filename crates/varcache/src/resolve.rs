//! Stable identities for memoized producers.
//!
//! `resolve` caches by the producer's structural identity instead of a
//! caller-chosen key. Identity is an explicit value built from the call
//! site's source location plus a digest of any captured state, so two
//! structurally distinct producers never collide and the same producer
//! maps to the same key on every call. Identities share the key namespace
//! and hash space with explicit `set` keys; collision with a user-chosen
//! string would require that string to spell out a source location and
//! digest, which makes accidental collision practically impossible.

use std::fmt;
use std::panic::Location;

use crate::key::Digest;

/// Identity of a memoized computation.
///
/// Constructed at the call site of the producer. Two identities are equal
/// exactly when they were built at the same source location with the same
/// captured state.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducerId {
    /// Source location of the producer's call site.
    location: &'static Location<'static>,

    /// Digest of the producer's captured state.
    state: Digest,
}

impl ProducerId {
    /// Identity for a producer with no captured state.
    #[track_caller]
    pub fn here() -> Self {
        Self {
            location: Location::caller(),
            state: Digest::of(&[]),
        }
    }

    /// Identity for a producer whose result depends on captured state.
    ///
    /// The caller serializes whatever the producer closes over into
    /// `state`; producers at the same call site with different captured
    /// state get different cache entries.
    #[track_caller]
    pub fn with_state(state: impl AsRef<[u8]>) -> Self {
        Self {
            location: Location::caller(),
            state: Digest::of(state.as_ref()),
        }
    }

    /// The cache key this identity maps to.
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "resolve@{}:{}:{}#{}",
            self.location.file(),
            self.location.line(),
            self.location.column(),
            self.state
        )
    }
}

impl fmt::Debug for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProducerId({}:{}:{})",
            self.location.file(),
            self.location.line(),
            self.location.column()
        )
    }
}
