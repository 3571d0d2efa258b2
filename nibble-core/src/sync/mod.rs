//! Network-aware request routing.
//!
//! - [`SyncCoordinator`] sends requests directly when online, serves reads
//!   from cache and queues writes when offline, and drains the queue when
//!   connectivity returns.
//! - [`ConnectivityMonitor`] carries reachability samples.
//! - [`Transport`] abstracts the HTTP client; [`HttpTransport`] uses reqwest.

mod connectivity;
mod coordinator;
mod error;
mod method;
mod transport;

pub use connectivity::{ConnectivityMonitor, NetworkState};
pub use coordinator::{
    DrainOutcome, DrainReport, RequestOptions, RequestOutcome, SkipReason, SyncCoordinator,
    SyncOptions, SyncStatus,
};
pub use error::{SyncError, TransportError};
pub use method::{HttpMethod, WriteMethod};
pub use transport::{probe_server, ApiRequest, ApiResponse, HttpTransport, Transport};
