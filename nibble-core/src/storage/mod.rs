//! Persistent key-value storage abstraction.
//!
//! The cache and the offline queue only need a string-keyed store that is
//! eventually durable across restarts. Backends may fail; callers in this
//! crate treat every failure as best-effort and never surface it.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read key '{key}': {message}")]
    Read { key: String, message: String },

    #[error("failed to write key '{key}': {message}")]
    Write { key: String, message: String },
}

/// Asynchronous string-keyed store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored at `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key in `keys`.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
