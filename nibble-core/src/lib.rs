//! Nibble Core Library
//!
//! Offline-first data layer for Nibble clients: a TTL cache over a pluggable
//! key-value store, a persistent queue of deferred writes, and a coordinator
//! that routes API calls depending on connectivity.

pub mod cache;
pub mod clock;
pub mod models;
pub mod queue;
pub mod storage;
pub mod sync;

pub use cache::{Cache, CacheEntry, CacheKey, CacheStats, DomainCache, EntityPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use models::{
    ChildProfile, CoachMessage, CoachRole, DetectedFood, DiaryEntry, FoodItem, MealPlan, MealType,
    Nutrient, PlannedMeal, ScanResult, UserProfile,
};
pub use queue::{DeadLetter, OfflineQueue, QueueItem};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use sync::{
    probe_server, ApiRequest, ApiResponse, ConnectivityMonitor, DrainOutcome, DrainReport,
    HttpMethod, HttpTransport, NetworkState, RequestOptions, RequestOutcome, SkipReason,
    SyncCoordinator, SyncError, SyncOptions, SyncStatus, Transport, TransportError, WriteMethod,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
