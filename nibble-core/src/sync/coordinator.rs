//! Online/offline request routing and queue draining.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::connectivity::NetworkState;
use super::error::{SyncError, TransportError};
use super::method::{HttpMethod, WriteMethod};
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::cache::{Cache, CacheKey};
use crate::queue::{OfflineQueue, QueueItem};

const LAST_SYNC_TTL_DAYS: i64 = 365;

/// Tunables for request handling and draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Upper bound on a single network attempt.
    pub request_timeout: Duration,
    /// Failed attempts after which a queued item is evicted.
    pub max_retries: u32,
    /// Pause after a failed replay is `retry_count * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Snapshot of the coordinator published to observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatus {
    /// Raw connectivity signal.
    pub online: bool,
    pub forced_offline: bool,
    /// `online && !forced_offline`; what request routing uses.
    pub effective_online: bool,
    pub sync_in_progress: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub queue_length: usize,
}

impl SyncStatus {
    fn recompute(&mut self) {
        self.effective_online = self.online && !self.forced_offline;
    }
}

/// Counts from one drain. `failed` includes `evicted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub succeeded: usize,
    pub failed: usize,
    pub evicted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyRunning,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Completed(DrainReport),
    Skipped(SkipReason),
}

impl DrainOutcome {
    pub fn report(&self) -> Option<DrainReport> {
        match self {
            DrainOutcome::Completed(report) => Some(*report),
            DrainOutcome::Skipped(_) => None,
        }
    }
}

/// Per-call routing options for [`SyncCoordinator::request`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Cache key for GET responses; enables the stale fallback.
    pub cache_key: Option<String>,
    /// TTL for the cached response; the cache default when `None`.
    pub cache_ttl: Option<chrono::Duration>,
    /// Queue writes made while offline instead of failing.
    pub queue_when_offline: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cache_key: None,
            cache_ttl: None,
            queue_when_offline: true,
        }
    }
}

impl RequestOptions {
    pub fn cached(key: impl Into<String>) -> Self {
        Self {
            cache_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn no_queue(mut self) -> Self {
        self.queue_when_offline = false;
        self
    }
}

/// How a request was satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Live response body.
    Completed(Value),
    /// Cached body served because the network was unavailable or failed.
    Cached(Value),
    /// Write deferred to the offline queue.
    Queued(QueueItem),
}

impl RequestOutcome {
    /// The response body, if any. Queued writes have none yet.
    pub fn value(&self) -> Option<&Value> {
        match self {
            RequestOutcome::Completed(value) | RequestOutcome::Cached(value) => Some(value),
            RequestOutcome::Queued(_) => None,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, RequestOutcome::Queued(_))
    }
}

/// Resets the in-progress flags even if a drain is cancelled mid-way.
struct DrainGuard<'a> {
    draining: &'a AtomicBool,
    status: &'a watch::Sender<SyncStatus>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.status
            .send_if_modified(|s| std::mem::replace(&mut s.sync_in_progress, false));
        self.draining.store(false, Ordering::Release);
    }
}

/// Routes API calls online or offline and replays the offline queue.
pub struct SyncCoordinator {
    transport: Arc<dyn Transport>,
    cache: Cache,
    queue: OfflineQueue,
    options: SyncOptions,
    draining: AtomicBool,
    status: watch::Sender<SyncStatus>,
}

impl SyncCoordinator {
    /// Builds a coordinator and restores the persisted last-sync time and
    /// queue length. The initial network state never triggers a drain.
    pub async fn new(
        transport: Arc<dyn Transport>,
        cache: Cache,
        options: SyncOptions,
        initial: NetworkState,
    ) -> Self {
        let queue = OfflineQueue::new(cache.clone());
        let last_sync_at = cache.get(CacheKey::LastSync.as_str()).await;
        let queue_length = queue.len().await;

        let mut status = SyncStatus {
            online: initial.is_online(),
            last_sync_at,
            queue_length,
            ..SyncStatus::default()
        };
        status.recompute();
        let (status, _rx) = watch::channel(status);

        Self {
            transport,
            cache,
            queue,
            options,
            draining: AtomicBool::new(false),
            status,
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Effective connectivity: online and not forced offline.
    pub fn is_online(&self) -> bool {
        self.status.borrow().effective_online
    }

    fn update_status(&self, f: impl FnOnce(&mut SyncStatus)) {
        self.status.send_if_modified(|status| {
            let before = status.clone();
            f(status);
            status.recompute();
            *status != before
        });
    }

    pub async fn refresh_queue_length(&self) -> usize {
        let len = self.queue.len().await;
        self.update_status(|s| s.queue_length = len);
        len
    }

    /// Applies a connectivity sample. Drains the queue when effective
    /// connectivity flips from offline to online.
    pub async fn set_network_state(&self, state: NetworkState) -> Option<DrainOutcome> {
        if self.apply_network_state(state).await {
            Some(self.drain().await)
        } else {
            None
        }
    }

    /// Records a connectivity sample without draining. Returns true when
    /// effective connectivity just came back.
    async fn apply_network_state(&self, state: NetworkState) -> bool {
        let was_online = self.is_online();
        self.update_status(|s| s.online = state.is_online());
        self.refresh_queue_length().await;
        self.log_transition(was_online)
    }

    /// Simulates offline mode regardless of real connectivity.
    ///
    /// Clearing the flag while the network is up drains immediately.
    pub async fn set_forced_offline(&self, forced: bool) -> Option<DrainOutcome> {
        let was_online = self.is_online();
        self.update_status(|s| s.forced_offline = forced);
        if self.log_transition(was_online) {
            Some(self.drain().await)
        } else {
            None
        }
    }

    fn log_transition(&self, was_online: bool) -> bool {
        let now_online = self.is_online();
        if was_online == now_online {
            return false;
        }
        tracing::info!(online = now_online, "connectivity changed");
        now_online
    }

    /// Follows a connectivity stream until its sender is dropped.
    ///
    /// Samples are applied as they arrive. A reconnect drain runs on its own
    /// task so that a drop in connectivity mid-drain is seen immediately.
    pub fn spawn_connectivity_watch(
        self: &Arc<Self>,
        mut rx: watch::Receiver<NetworkState>,
    ) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let mut state = *rx.borrow_and_update();
            loop {
                if coordinator.apply_network_state(state).await {
                    coordinator.spawn_drain();
                }
                if rx.changed().await.is_err() {
                    break;
                }
                state = *rx.borrow_and_update();
            }
            tracing::debug!("connectivity stream closed");
        })
    }

    fn spawn_drain(self: &Arc<Self>) -> JoinHandle<DrainOutcome> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = coordinator.drain().await;
            if let DrainOutcome::Completed(report) = outcome {
                tracing::debug!(?report, "reconnect drain finished");
            }
            outcome
        })
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let timeout = self.options.request_timeout;
        match tokio::time::timeout(timeout, self.transport.send(request, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Enqueues a write directly, bypassing routing.
    pub async fn enqueue(
        &self,
        endpoint: impl Into<String>,
        method: WriteMethod,
        payload: Value,
    ) -> QueueItem {
        let item = self.queue.enqueue(endpoint, method, payload).await;
        self.refresh_queue_length().await;
        item
    }

    /// Performs an API call, falling back to the cache or the offline queue.
    ///
    /// Online: the call goes out directly. A successful GET with a cache key
    /// refreshes the cache. A failed GET with a cache key serves the cached
    /// value if one exists; every other failure propagates.
    ///
    /// Offline: GETs are served from cache or fail with
    /// [`SyncError::NoCachedData`]; writes are queued unless the caller
    /// opted out.
    pub async fn request(
        &self,
        request: ApiRequest,
        options: RequestOptions,
    ) -> Result<RequestOutcome, SyncError> {
        if !self.is_online() {
            return self.request_offline(request, options).await;
        }

        let is_read = request.method == HttpMethod::Get;
        let error = match self.send(&request).await {
            Ok(response) if response.is_success() => {
                if let (true, Some(key)) = (is_read, &options.cache_key) {
                    self.cache.set(key, &response.body, options.cache_ttl).await;
                }
                return Ok(RequestOutcome::Completed(response.body));
            }
            Ok(response) => SyncError::Http {
                status: response.status,
                body: response.body,
            },
            Err(e) => SyncError::Transport(e),
        };

        if let (true, Some(key)) = (is_read, &options.cache_key) {
            if let Some(value) = self.cache.get::<Value>(key).await {
                tracing::warn!(endpoint = %request.endpoint, error = %error, "request failed, serving cached data");
                return Ok(RequestOutcome::Cached(value));
            }
        }

        Err(error)
    }

    async fn request_offline(
        &self,
        request: ApiRequest,
        options: RequestOptions,
    ) -> Result<RequestOutcome, SyncError> {
        let Some(method) = request.method.as_write() else {
            let cached = match &options.cache_key {
                Some(key) => self.cache.get::<Value>(key).await,
                None => None,
            };
            return cached.map(RequestOutcome::Cached).ok_or(SyncError::NoCachedData {
                endpoint: request.endpoint,
            });
        };

        if !options.queue_when_offline {
            return Err(SyncError::Offline {
                method: request.method,
                endpoint: request.endpoint,
            });
        }

        let payload = request.body.unwrap_or(Value::Null);
        let item = self.enqueue(request.endpoint, method, payload).await;
        tracing::info!(id = %item.id, endpoint = %item.endpoint, "offline, request queued");
        Ok(RequestOutcome::Queued(item))
    }

    /// Replays the offline queue in FIFO order.
    ///
    /// At most one drain runs at a time; a concurrent call returns
    /// [`SkipReason::AlreadyRunning`] without touching the network. Items
    /// that reach the retry ceiling are moved to the dead-letter list.
    pub async fn drain(&self) -> DrainOutcome {
        if !self.is_online() {
            return DrainOutcome::Skipped(SkipReason::Offline);
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("drain already in progress");
            return DrainOutcome::Skipped(SkipReason::AlreadyRunning);
        }
        let _guard = DrainGuard {
            draining: &self.draining,
            status: &self.status,
        };
        self.update_status(|s| s.sync_in_progress = true);

        let report = self.replay_snapshot().await;

        let now = self.cache.now();
        self.cache
            .set(
                CacheKey::LastSync.as_str(),
                &now,
                Some(chrono::Duration::days(LAST_SYNC_TTL_DAYS)),
            )
            .await;
        let queue_length = self.queue.len().await;
        self.update_status(|s| {
            s.sync_in_progress = false;
            s.last_sync_at = Some(now);
            s.queue_length = queue_length;
        });

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            evicted = report.evicted,
            pending = queue_length,
            "queue drained"
        );
        DrainOutcome::Completed(report)
    }

    async fn replay_snapshot(&self) -> DrainReport {
        let max_retries = self.options.max_retries;
        let mut report = DrainReport::default();

        for item in self.queue.list().await {
            if item.retry_count >= max_retries {
                self.queue
                    .evict(&item.id, format!("retry limit of {} reached", max_retries))
                    .await;
                report.failed += 1;
                report.evicted += 1;
                tracing::warn!(id = %item.id, endpoint = %item.endpoint, "dropping request after retry limit");
                continue;
            }

            let reason = match self.send(&ApiRequest::from(&item)).await {
                Ok(response) if response.is_success() => {
                    self.queue.dequeue(&item.id).await;
                    report.succeeded += 1;
                    tracing::debug!(id = %item.id, endpoint = %item.endpoint, "replayed request");
                    continue;
                }
                Ok(response) => format!("server returned status {}", response.status),
                Err(e) => e.to_string(),
            };

            report.failed += 1;
            let retries = self
                .queue
                .increment_retry(&item.id)
                .await
                .unwrap_or(item.retry_count + 1);
            tracing::warn!(
                id = %item.id,
                endpoint = %item.endpoint,
                retries,
                error = %reason,
                "replay failed"
            );

            if retries >= max_retries {
                self.queue.evict(&item.id, reason).await;
                report.evicted += 1;
                tracing::warn!(id = %item.id, endpoint = %item.endpoint, "dropping request after retry limit");
            }

            tokio::time::sleep(self.options.backoff_unit * retries).await;
        }

        report
    }
}
