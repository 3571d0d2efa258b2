//! Network reachability signal.
//!
//! Platform code pushes samples into a [`ConnectivityMonitor`]; the sync
//! coordinator subscribes to it and reacts to transitions.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// One reachability sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NetworkState {
    /// A network interface is up.
    pub reachable: bool,
    /// The internet (and thus the backend) can actually be reached.
    pub internet_reachable: bool,
}

impl NetworkState {
    pub const ONLINE: NetworkState = NetworkState {
        reachable: true,
        internet_reachable: true,
    };

    pub const OFFLINE: NetworkState = NetworkState {
        reachable: false,
        internet_reachable: false,
    };

    /// Online requires both signals.
    pub fn is_online(&self) -> bool {
        self.reachable && self.internet_reachable
    }
}

/// Broadcasts the latest [`NetworkState`] to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<NetworkState>>,
}

impl ConnectivityMonitor {
    pub fn new(initial: NetworkState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Samples the current state.
    pub fn current(&self) -> NetworkState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }

    /// Publishes a new sample. Returns true when it differs from the last one.
    pub fn update(&self, state: NetworkState) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            tracing::debug!(
                reachable = state.reachable,
                internet_reachable = state.internet_reachable,
                "network state changed"
            );
        }
        changed
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(NetworkState::OFFLINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_requires_both_signals() {
        assert!(NetworkState::ONLINE.is_online());
        assert!(!NetworkState {
            reachable: true,
            internet_reachable: false
        }
        .is_online());
        assert!(!NetworkState {
            reachable: false,
            internet_reachable: true
        }
        .is_online());
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let monitor = ConnectivityMonitor::new(NetworkState::OFFLINE);
        let mut rx = monitor.subscribe();

        assert!(monitor.update(NetworkState::ONLINE));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), NetworkState::ONLINE);
        assert_eq!(monitor.current(), NetworkState::ONLINE);
    }

    #[test]
    fn test_update_with_same_state_is_not_a_change() {
        let monitor = ConnectivityMonitor::new(NetworkState::ONLINE);
        let rx = monitor.subscribe();
        assert!(!monitor.update(NetworkState::ONLINE));
        assert!(!rx.has_changed().unwrap());
    }
}
