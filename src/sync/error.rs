//! Error definitions for the synchronization engine

use thiserror::Error;

use super::device::DeviceId;
use super::dispatcher::Intent;
use super::topics::TopicKey;

/// Errors raised by the device state store and the topic registry
#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    /// A configured topic key is not part of the registry
    #[error("Unknown topic key: {0}")]
    UnknownTopicKey(String),

    /// The topic carries sensor readings, not device status
    #[error("Topic {0} carries sensor readings, not device status")]
    NotADevice(TopicKey),

    /// The operation does not exist for this device kind
    #[error("Unsupported operation for {device}: {operation}")]
    Unsupported {
        device: DeviceId,
        operation: &'static str,
    },

    /// An inbound payload could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Malformed inbound payloads. These never change state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Malformed reading on {topic}: {payload:?}")]
    MalformedReading { topic: String, payload: String },

    #[error("Malformed level on {topic}: {payload:?}")]
    MalformedLevel { topic: String, payload: String },
}

/// Errors returned by the command dispatcher
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    /// Commands are blocked while the broker connection is down
    #[error("Not connected to broker, refusing {0}")]
    Refused(Intent),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Failures reported by a transport implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport is not connected")]
    NotConnected,

    #[error("Subscribe to {topic} failed: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },
}
