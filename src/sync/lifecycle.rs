//! Connection lifecycle adapter
//!
//! The transport owns connecting, retrying and credentials. This adapter only
//! reacts to what it is told:
//!
//! ```text
//! Disconnected ──Connected──► Connected ──Disconnected / Lost / Failed──► Disconnected
//!      ▲                                                                       │
//!      └───────────────────────── store marked stale ◄─────────────────────────┘
//! ```

use std::fmt;

use tracing::{info, warn};

use super::store::DeviceStateStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connected => write!(f, "Connected"),
        }
    }
}

/// Signals handed in by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Broker accepted the session at this endpoint
    Connected { endpoint: String },
    /// Closed on request
    Disconnected,
    /// Established connection dropped
    Lost(String),
    /// Connection attempt never succeeded
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Fresh connection, subscriptions have to be issued
    Subscribe,
    /// Connection went away, displayed values may be outdated
    Stale { reason: Option<String> },
    /// Nothing changed
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionLifecycle {
    status: ConnectionStatus,
    endpoint: Option<String>,
    last_error: Option<String>,
    connects: u32,
}

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Endpoint of the most recent successful connection
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn connects(&self) -> u32 {
        self.connects
    }

    pub fn handle(&mut self, event: ConnectionEvent, store: &mut DeviceStateStore) -> LifecycleOutcome {
        match event {
            ConnectionEvent::Connected { endpoint } => {
                info!("Connected to broker at {}", endpoint);
                self.status = ConnectionStatus::Connected;
                self.endpoint = Some(endpoint);
                self.last_error = None;
                self.connects += 1;
                store.mark_fresh();
                LifecycleOutcome::Subscribe
            }
            ConnectionEvent::Disconnected => {
                if self.status == ConnectionStatus::Disconnected {
                    return LifecycleOutcome::Ignored;
                }
                info!("Disconnected from broker");
                self.status = ConnectionStatus::Disconnected;
                store.mark_stale();
                LifecycleOutcome::Stale { reason: None }
            }
            ConnectionEvent::Lost(reason) | ConnectionEvent::Failed(reason) => {
                warn!("Broker connection unavailable: {}", reason);
                self.status = ConnectionStatus::Disconnected;
                self.last_error = Some(reason.clone());
                store.mark_stale();
                LifecycleOutcome::Stale {
                    reason: Some(reason),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(endpoint: &str) -> ConnectionEvent {
        ConnectionEvent::Connected {
            endpoint: endpoint.to_string(),
        }
    }

    #[test]
    fn connect_requests_subscriptions_and_clears_stale() {
        let mut lifecycle = ConnectionLifecycle::new();
        let mut store = DeviceStateStore::new();
        store.mark_stale();

        let outcome = lifecycle.handle(connected("broker:1883"), &mut store);
        assert_eq!(outcome, LifecycleOutcome::Subscribe);
        assert!(lifecycle.is_connected());
        assert!(!store.is_stale());
        assert_eq!(lifecycle.endpoint(), Some("broker:1883"));
    }

    #[test]
    fn loss_marks_store_stale() {
        let mut lifecycle = ConnectionLifecycle::new();
        let mut store = DeviceStateStore::new();
        lifecycle.handle(connected("broker:1883"), &mut store);

        let outcome = lifecycle.handle(ConnectionEvent::Lost("timeout".to_string()), &mut store);
        assert_eq!(
            outcome,
            LifecycleOutcome::Stale {
                reason: Some("timeout".to_string())
            }
        );
        assert_eq!(lifecycle.status(), ConnectionStatus::Disconnected);
        assert_eq!(lifecycle.last_error(), Some("timeout"));
        assert!(store.is_stale());
    }

    #[test]
    fn repeated_disconnect_is_ignored() {
        let mut lifecycle = ConnectionLifecycle::new();
        let mut store = DeviceStateStore::new();
        lifecycle.handle(connected("broker:1883"), &mut store);

        assert_eq!(
            lifecycle.handle(ConnectionEvent::Disconnected, &mut store),
            LifecycleOutcome::Stale { reason: None }
        );
        assert_eq!(
            lifecycle.handle(ConnectionEvent::Disconnected, &mut store),
            LifecycleOutcome::Ignored
        );
    }

    #[test]
    fn failure_before_connect_is_reported() {
        let mut lifecycle = ConnectionLifecycle::new();
        let mut store = DeviceStateStore::new();

        lifecycle.handle(ConnectionEvent::Failed("refused".to_string()), &mut store);
        assert!(!lifecycle.is_connected());
        assert_eq!(lifecycle.connects(), 0);
        assert!(store.is_stale());
    }
}
