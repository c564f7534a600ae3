//! # MQTT Transport
//!
//! Connects the sync engine to a real broker through rumqttc. The UI thread
//! holds an [`MqttHandle`](mqtt_handler::MqttHandle) and calls it
//! synchronously, a tokio task polls the event loop and forwards connection
//! signals and publishes over an mpsc channel.
//!
//! ```text
//! mqtt/
//! ├── config.rs           - broker settings
//! ├── message_manager.rs  - received message and event types
//! └── mqtt_handler.rs     - client handle and event loop task
//! ```
//!
//! ```text
//!  UI thread                          tokio runtime
//!  ─────────                          ─────────────
//!  MqttHandle ──try_publish──────────► EventLoop::poll
//!      ▲                                    │
//!      └──── mpsc<TransportEvent> ◄─────────┘
//! ```
//!
//! There is no automatic reconnect. A dropped connection is reported as
//! `Lost`, an attempt that never got a CONNACK as `Failed`.

pub mod config;
pub mod message_manager;
pub mod mqtt_handler;

pub use config::MqttConfig;
pub use message_manager::{MQTTMessage, TransportEvent, TransportEventKind};
pub use mqtt_handler::MqttHandle;
