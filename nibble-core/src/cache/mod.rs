//! Best-effort key-value cache with per-entry TTL.
//!
//! Values are wrapped in a [`CacheEntry`], serialized to JSON, passed
//! through the [`obfuscate`] transform and written to a [`KeyValueStore`].
//! The cache is never authoritative: every storage or decoding failure is
//! logged and reported to the caller as a miss.

mod domain;
mod entry;
mod keys;
pub mod obfuscate;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::clock::Clock;
use crate::storage::KeyValueStore;

pub use domain::{CacheStats, DomainCache, EntityPolicy};
pub use entry::CacheEntry;
pub use keys::CacheKey;

/// TTL, in seconds, applied when a caller does not supply one.
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// Key-value cache over a pluggable store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Stores `data` under `key`, replacing any previous value.
    pub async fn set<T>(&self, key: &str, data: &T, ttl: Option<Duration>)
    where
        T: Serialize + ?Sized,
    {
        let entry = CacheEntry::new(data, self.clock.now(), ttl.unwrap_or(self.default_ttl));

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &obfuscate::conceal(&json)).await {
            tracing::warn!(key, error = %e, "failed to persist cache entry");
        }
    }

    /// Returns the value at `key`, or `None` when absent, expired or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_entry(key).await.map(|entry| entry.data)
    }

    /// Like [`get`](Self::get) but keeps the entry metadata.
    ///
    /// Expired entries are removed from the store as a side effect.
    pub async fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        // Entries written before obfuscation was introduced are plain JSON.
        let json = obfuscate::reveal(&raw).unwrap_or(raw);

        let entry: CacheEntry<T> = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                return None;
            }
        };

        if entry.is_expired(self.clock.now()) {
            tracing::debug!(key, stored_at = %entry.stored_at, "cache entry expired");
            self.remove(key).await;
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(entry)
    }

    /// Returns true when `key` holds a live entry of any shape.
    pub async fn contains(&self, key: &str) -> bool {
        self.get_entry::<serde_json::Value>(key).await.is_some()
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            tracing::warn!(key, error = %e, "failed to remove cache entry");
        }
    }

    /// Removes every domain key (see [`CacheKey::DOMAIN`]).
    pub async fn clear_all(&self) {
        let keys: Vec<&str> = CacheKey::DOMAIN.iter().map(CacheKey::as_str).collect();
        match self.store.multi_remove(&keys).await {
            Ok(()) => tracing::info!(count = keys.len(), "cleared cached data"),
            Err(e) => tracing::warn!(error = %e, "failed to clear cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Snack {
        name: String,
        grams: u32,
    }

    fn test_cache() -> (Cache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let cache = Cache::new(store.clone(), clock.clone());
        (cache, store, clock)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_equal_value() {
        let (cache, _store, _clock) = test_cache();
        let snack = Snack {
            name: "apple slices".to_string(),
            grams: 80,
        };

        cache.set("snack", &snack, Some(Duration::minutes(5))).await;

        assert_eq!(cache.get::<Snack>("snack").await, Some(snack));
    }

    #[tokio::test]
    async fn test_stored_value_is_not_plain_json() {
        let (cache, store, _clock) = test_cache();
        cache.set("k", &"carrot sticks", None).await;

        let raw = store.get("k").await.unwrap().unwrap();
        assert!(!raw.contains("carrot"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let (cache, store, clock) = test_cache();
        cache.set("k", &42u32, Some(Duration::seconds(30))).await;

        clock.advance(Duration::seconds(31));
        assert!(store.get("k").await.unwrap().is_some());

        assert_eq!(cache.get::<u32>("k").await, None);
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_alive_at_exact_ttl() {
        let (cache, _store, clock) = test_cache();
        cache.set("k", &1u8, Some(Duration::seconds(30))).await;
        clock.advance(Duration::seconds(30));
        assert_eq!(cache.get::<u8>("k").await, Some(1));
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let (cache, _store, clock) = test_cache();
        let cache = cache.with_default_ttl(Duration::hours(1));
        cache.set("k", &"v", None).await;

        let entry = cache.get_entry::<String>("k").await.unwrap();
        assert_eq!(entry.ttl(), Duration::hours(1));

        clock.advance(Duration::hours(2));
        assert!(cache.get::<String>("k").await.is_none());
    }

    #[tokio::test]
    async fn test_legacy_plain_entry_is_readable() {
        let (cache, store, clock) = test_cache();
        let legacy = CacheEntry::new(
            Snack {
                name: "pear".to_string(),
                grams: 120,
            },
            clock.now(),
            Duration::days(1),
        );
        store
            .set("legacy", &serde_json::to_string(&legacy).unwrap())
            .await
            .unwrap();

        let snack: Snack = cache.get("legacy").await.unwrap();
        assert_eq!(snack.name, "pear");
    }

    #[tokio::test]
    async fn test_malformed_entry_is_a_miss() {
        let (cache, store, _clock) = test_cache();
        store.set("broken", "not even close").await.unwrap();
        assert_eq!(cache.get::<Snack>("broken").await, None);

        cache.set("wrong_shape", &"a string", None).await;
        assert_eq!(cache.get::<Snack>("wrong_shape").await, None);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let (cache, store, _clock) = test_cache();
        store.fail_writes(true);
        cache.set("k", &1u8, None).await;
        assert_eq!(cache.get::<u8>("k").await, None);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_offline_queue() {
        let (cache, store, _clock) = test_cache();
        cache.set(CacheKey::UserProfile.as_str(), &"me", None).await;
        cache.set(CacheKey::MealPlans.as_str(), &[1, 2, 3], None).await;
        cache
            .set(CacheKey::OfflineQueue.as_str(), &Vec::<u8>::new(), None)
            .await;
        cache.set("caller_key", &true, None).await;

        cache.clear_all().await;

        assert!(!cache.contains(CacheKey::UserProfile.as_str()).await);
        assert!(!cache.contains(CacheKey::MealPlans.as_str()).await);
        assert!(cache.contains(CacheKey::OfflineQueue.as_str()).await);
        assert!(cache.contains("caller_key").await);
        assert_eq!(store.len(), 2);
    }
}
