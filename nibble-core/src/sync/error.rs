//! Sync and transport error types.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::method::HttpMethod;

/// Failures of a single HTTP exchange.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by [`SyncCoordinator::request`](super::SyncCoordinator::request).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Offline read with nothing cached. Distinct from a successful empty answer.
    #[error("no cached data available offline for {endpoint}")]
    NoCachedData { endpoint: String },

    /// Offline write from a caller that opted out of queueing.
    #[error("offline: {method} {endpoint} was not sent")]
    Offline { method: HttpMethod, endpoint: String },

    #[error("server returned status {status}")]
    Http { status: u16, body: Value },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SyncError {
    /// True for errors caused by the network rather than by the request itself.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            SyncError::Offline { .. }
                | SyncError::NoCachedData { .. }
                | SyncError::Transport(TransportError::Timeout(_))
                | SyncError::Transport(TransportError::Connection(_))
        )
    }
}
