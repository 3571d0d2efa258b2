use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached payload together with its expiry bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, stored_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            data,
            stored_at,
            ttl_seconds: ttl.num_seconds(),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.stored_at + self.ttl()
    }

    /// An entry is expired once strictly more than its TTL has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at > self.ttl()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_boundary() {
        let stored = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry::new("x", stored, Duration::seconds(60));

        assert!(!entry.is_expired(stored));
        assert!(!entry.is_expired(stored + Duration::seconds(60)));
        assert!(entry.is_expired(stored + Duration::seconds(61)));
        assert_eq!(entry.expires_at(), stored + Duration::seconds(60));
    }

    #[test]
    fn test_zero_ttl_expires_after_any_time() {
        let stored = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry::new(1u8, stored, Duration::zero());
        assert!(!entry.is_expired(stored));
        assert!(entry.is_expired(stored + Duration::milliseconds(1)));
    }
}
