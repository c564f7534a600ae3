//! # Device State Synchronization
//!
//! Keeps the dashboard's view of the house in step with the broker. Inbound
//! status messages are decoded and applied to a single state store, user
//! intents become optimistic updates plus outbound commands, and the
//! temperature stream is kept in a short rolling window for the chart.
//!
//! ## Module Layout
//!
//! ```text
//! sync/
//! ├── topics.rs      - topic registry (smarthome/web/* in, smarthome/esp32/* out)
//! ├── telemetry.rs   - bounded reading window
//! ├── device.rs      - device ids, kinds and states
//! ├── decoder.rs     - (topic, payload) -> Inbound
//! ├── store.rs       - device state store, single mutation entry point
//! ├── dispatcher.rs  - Intent -> Outbound + optimistic update
//! ├── lifecycle.rs   - connection signals -> stale marking / resubscribe
//! ├── session.rs     - context object tying it together
//! └── error.rs
//! ```
//!
//! Nothing in here blocks or does I/O. Transport and rendering are reached
//! through the [`Transport`] and [`Presentation`] traits.

pub mod decoder;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod topics;

pub use decoder::{decode, Inbound};
pub use device::{AlarmPhase, DeviceId, DeviceKind, DeviceState, Power, SensorId};
pub use dispatcher::{dispatch, Dispatch, Intent, Outbound};
pub use error::{DecodeError, DispatchError, SyncError, TransportError};
pub use lifecycle::{ConnectionEvent, ConnectionLifecycle, ConnectionStatus};
pub use session::{LogLevel, Presentation, SyncSession, Transport};
pub use store::{DeviceStateStore, InboundOutcome, Mutation, Origin, StateChange};
pub use telemetry::{TelemetryReading, TelemetryWindow, WINDOW_CAPACITY};
pub use topics::{TopicKey, TopicRegistry};
