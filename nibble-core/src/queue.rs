//! Persisted FIFO of mutating requests that could not reach the backend.
//!
//! The whole queue lives in a single cache entry ([`CacheKey::OfflineQueue`]).
//! Items keep their enqueue order for their entire life: a failed replay
//! bumps the retry count in place, it never moves the item to the back.

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cache::{Cache, CacheKey};
use crate::sync::WriteMethod;

/// Queue and dead-letter entries outlive any domain cache entry.
const QUEUE_TTL_DAYS: i64 = 365;

/// Most recent evictions kept in the dead-letter list.
pub const MAX_DEAD_LETTERS: usize = 100;

/// A deferred mutating request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub endpoint: String,
    pub method: WriteMethod,
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    /// SHA-256 of method, endpoint and payload. Identical requests share it.
    #[serde(default)]
    pub fingerprint: String,
}

impl QueueItem {
    fn new(endpoint: String, method: WriteMethod, payload: Value, now: DateTime<Utc>) -> Self {
        let fingerprint = fingerprint(method, &endpoint, &payload);
        Self {
            id: generate_id(now),
            endpoint,
            method,
            payload,
            enqueued_at: now,
            retry_count: 0,
            fingerprint,
        }
    }
}

/// A queue item that hit the retry ceiling and was evicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub item: QueueItem,
    pub evicted_at: DateTime<Utc>,
    pub reason: String,
}

/// `<unix millis>-<9 random lowercase alphanumerics>`
fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

fn fingerprint(method: WriteMethod, endpoint: &str, payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_string().as_bytes());
    hasher.update(b" ");
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\n");
    hasher.update(payload.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The offline operation queue.
///
/// Clones share the same underlying entry and the same write lock, so
/// concurrent read-modify-write cycles never lose an update.
#[derive(Clone)]
pub struct OfflineQueue {
    cache: Cache,
    lock: Arc<Mutex<()>>,
}

impl OfflineQueue {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn ttl() -> Duration {
        Duration::days(QUEUE_TTL_DAYS)
    }

    async fn load(&self) -> Vec<QueueItem> {
        self.cache
            .get(CacheKey::OfflineQueue.as_str())
            .await
            .unwrap_or_default()
    }

    async fn save(&self, items: &[QueueItem]) {
        self.cache
            .set(CacheKey::OfflineQueue.as_str(), items, Some(Self::ttl()))
            .await;
    }

    /// Appends a request to the queue and returns the stored item.
    ///
    /// Identical requests are not merged; each call produces its own entry.
    pub async fn enqueue(
        &self,
        endpoint: impl Into<String>,
        method: WriteMethod,
        payload: Value,
    ) -> QueueItem {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let item = QueueItem::new(endpoint.into(), method, payload, self.cache.now());

        if items.iter().any(|i| i.fingerprint == item.fingerprint) {
            tracing::warn!(
                endpoint = %item.endpoint,
                method = %item.method,
                "an identical request is already pending; it will be replayed twice"
            );
        }

        items.push(item.clone());
        self.save(&items).await;
        tracing::debug!(id = %item.id, endpoint = %item.endpoint, pending = items.len(), "queued request");
        item
    }

    /// Removes the item with `id`. Unknown ids are ignored.
    pub async fn dequeue(&self, id: &str) {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() != before {
            self.save(&items).await;
        }
    }

    /// Bumps the retry count of `id` and returns the new count.
    pub async fn increment_retry(&self, id: &str) -> Option<u32> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let item = items.iter_mut().find(|i| i.id == id)?;
        item.retry_count += 1;
        let count = item.retry_count;
        self.save(&items).await;
        Some(count)
    }

    /// Pending items, oldest first.
    pub async fn list(&self) -> Vec<QueueItem> {
        self.load().await
    }

    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        self.cache.remove(CacheKey::OfflineQueue.as_str()).await;
    }

    /// Removes `id` from the queue and records it in the dead-letter list.
    pub async fn evict(&self, id: &str, reason: impl Into<String>) -> Option<QueueItem> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await;
        let position = items.iter().position(|i| i.id == id)?;
        let item = items.remove(position);
        self.save(&items).await;

        let mut letters = self.load_dead_letters().await;
        letters.push(DeadLetter {
            item: item.clone(),
            evicted_at: self.cache.now(),
            reason: reason.into(),
        });
        let overflow = letters.len().saturating_sub(MAX_DEAD_LETTERS);
        letters.drain(..overflow);
        self.cache
            .set(CacheKey::DeadLetter.as_str(), &letters, Some(Self::ttl()))
            .await;

        Some(item)
    }

    async fn load_dead_letters(&self) -> Vec<DeadLetter> {
        self.cache
            .get(CacheKey::DeadLetter.as_str())
            .await
            .unwrap_or_default()
    }

    /// Requests evicted after exhausting their retries, oldest first.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.load_dead_letters().await
    }

    pub async fn clear_dead_letters(&self) {
        let _guard = self.lock.lock().await;
        self.cache.remove(CacheKey::DeadLetter.as_str()).await;
    }
}
