//! Time-to-live resolution.
//!
//! A TTL is either a relative duration from the time of the write or an
//! absolute deadline. Both resolve to a unix-millisecond timestamp that is
//! embedded in the artifact and checked on every load.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time-to-live for a cache entry.
///
/// Absence of a TTL (`Option::<Ttl>::None` at the call site) means the
/// entry never expires. Unsupported TTL kinds cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expire this long after the entry is written.
    Duration(Duration),
    /// Expire at this absolute instant.
    At(SystemTime),
}

impl Ttl {
    /// Resolves the TTL to an absolute deadline in unix milliseconds.
    ///
    /// A relative duration is added to `now` saturating on overflow. An
    /// absolute deadline before the unix epoch resolves to 0, i.e. already
    /// expired.
    pub fn deadline_millis(&self, now: u64) -> u64 {
        match self {
            Ttl::Duration(d) => {
                let millis = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                now.saturating_add(millis)
            }
            Ttl::At(instant) => system_time_millis(*instant),
        }
    }
}

/// Returns the current wall clock in unix milliseconds.
///
/// A system clock set before 1970 yields 0, which makes every deadline
/// appear passed; logged once rather than on every call.
pub(crate) fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as u64,
        Err(err) => {
            static REPORTED: std::sync::OnceLock<()> = std::sync::OnceLock::new();
            if REPORTED.set(()).is_ok() {
                tracing::debug!(
                    target: "varcache",
                    error = %err,
                    "system time is before unix epoch; using 0"
                );
            }
            0
        }
    }
}

fn system_time_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_adds_to_now() {
        let ttl = Ttl::Duration(Duration::from_secs(60));
        assert_eq!(ttl.deadline_millis(1_000), 61_000);
    }

    #[test]
    fn duration_saturates_on_overflow() {
        let ttl = Ttl::Duration(Duration::MAX);
        assert_eq!(ttl.deadline_millis(u64::MAX - 1), u64::MAX);
    }

    #[test]
    fn absolute_deadline_ignores_now() {
        let instant = UNIX_EPOCH + Duration::from_millis(5_000);
        let ttl = Ttl::At(instant);
        assert_eq!(ttl.deadline_millis(0), 5_000);
        assert_eq!(ttl.deadline_millis(999_999), 5_000);
    }

    #[test]
    fn pre_epoch_deadline_is_already_expired() {
        let instant = UNIX_EPOCH - Duration::from_secs(1);
        let ttl = Ttl::At(instant);
        assert_eq!(ttl.deadline_millis(1_000), 0);
    }

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        assert!(a > 0);
    }
}
