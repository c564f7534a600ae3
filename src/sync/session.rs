//! Sync session
//!
//! Explicit context object that owns every piece of core state for one
//! process session. The owner feeds it three kinds of events, one at a time:
//!
//! ```text
//! Transport ─ (topic, payload) ──► handle_message    ──┐
//! Transport ─ ConnectionEvent  ──► handle_connection ──┼──► Presentation
//! User      ─ Intent           ──► handle_intent     ──┘        │
//!                                        │                      ▼
//!                                        └──► Transport::publish / subscribe
//! ```
//!
//! Mutation only happens inside these handlers, so a single owner is the only
//! writer. If transport callbacks ever run on several threads, wrap the whole
//! session in one mutex.

use tracing::{debug, error, info, warn};

use super::decoder::{decode, Inbound};
use super::device::{DeviceId, DeviceState, SensorId};
use super::dispatcher::{dispatch, Dispatch, Intent};
use super::error::{DecodeError, DispatchError, TransportError};
use super::lifecycle::{ConnectionEvent, ConnectionLifecycle, ConnectionStatus, LifecycleOutcome};
use super::store::{DeviceStateStore, Mutation, Origin};
use super::telemetry::TelemetryWindow;
use super::topics::{Route, TopicKey, TopicRegistry};

/// Outbound side of the broker connection
pub trait Transport {
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Notifications consumed by the rendering layer
pub trait Presentation {
    fn on_device_state_changed(&mut self, device: DeviceId, state: &DeviceState);
    fn on_telemetry_updated(&mut self, snapshot: &[f64]);
    fn on_unrecognized_message(&mut self, topic: &str, payload: &str);

    fn on_reading(&mut self, _sensor: SensorId, _value: f64) {}
    fn on_connection_changed(&mut self, _status: ConnectionStatus, _stale: bool) {}
    fn on_log(&mut self, _level: LogLevel, _message: &str) {}
}

#[derive(Debug, Default)]
pub struct SyncSession {
    registry: TopicRegistry,
    store: DeviceStateStore,
    temperature: TelemetryWindow,
    humidity: Option<f64>,
    lifecycle: ConnectionLifecycle,
}

impl SyncSession {
    pub fn new(registry: TopicRegistry) -> Self {
        Self {
            registry,
            ..Default::default()
        }
    }

    pub fn store(&self) -> &DeviceStateStore {
        &self.store
    }

    pub fn temperature(&self) -> &TelemetryWindow {
        &self.temperature
    }

    pub fn humidity(&self) -> Option<f64> {
        self.humidity
    }

    pub fn status(&self) -> ConnectionStatus {
        self.lifecycle.status()
    }

    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Handles one inbound broker message.
    ///
    /// Returns the classification. Decode errors are already reported to the
    /// presentation and never change state.
    pub fn handle_message<P>(
        &mut self,
        topic: &str,
        payload: &str,
        view: &mut P,
    ) -> Result<Inbound, DecodeError>
    where
        P: Presentation + ?Sized,
    {
        debug!("Inbound [{}] {:?}", topic, payload);

        let inbound = match decode(topic, payload) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("Dropping inbound message: {}", e);
                view.on_log(LogLevel::Error, &e.to_string());
                return Err(e);
            }
        };

        match &inbound {
            Inbound::Reading {
                sensor: SensorId::Temperature,
                value,
            } => {
                self.temperature.push(*value);
                view.on_reading(SensorId::Temperature, *value);
                view.on_telemetry_updated(&self.temperature.snapshot());
            }
            Inbound::Reading {
                sensor: SensorId::Humidity,
                value,
            } => {
                self.humidity = Some(*value);
                view.on_reading(SensorId::Humidity, *value);
            }
            Inbound::Unrecognized { topic, payload } => {
                view.on_unrecognized_message(topic, payload);
                let message = match TopicKey::from_inbound(topic) {
                    Some(key) => format!("{} state => unknown ({payload})", label_for(key)),
                    None => format!("Unrecognized message on {topic}: {payload}"),
                };
                view.on_log(LogLevel::Warn, &message);
            }
            other => {
                if let Some(mutation) = Mutation::from_inbound(other) {
                    match self.store.apply(mutation, Origin::Broker) {
                        Ok(change) => {
                            view.on_device_state_changed(change.device, &change.current);
                            view.on_log(
                                LogLevel::Info,
                                &format!("{} state => {}", change.device.label(), change.current),
                            );
                        }
                        Err(e) => error!("Inbound status rejected by store: {}", e),
                    }
                }
            }
        }

        Ok(inbound)
    }

    /// Handles one connection signal from the transport.
    pub fn handle_connection<T, P>(&mut self, event: ConnectionEvent, transport: &mut T, view: &mut P)
    where
        T: Transport + ?Sized,
        P: Presentation + ?Sized,
    {
        if let ConnectionEvent::Connected { endpoint } = &event {
            let switched = self
                .lifecycle
                .endpoint()
                .is_some_and(|previous| previous != endpoint.as_str());
            if switched {
                info!("Broker endpoint changed to {}, resetting session", endpoint);
                self.reset(view);
            }
        }

        match self.lifecycle.handle(event, &mut self.store) {
            LifecycleOutcome::Subscribe => {
                view.on_log(LogLevel::Info, "Connected to MQTT broker");
                self.subscribe_all(transport, view);
            }
            LifecycleOutcome::Stale { reason: Some(reason) } => {
                view.on_log(LogLevel::Error, &format!("Connection lost: {reason}"));
            }
            LifecycleOutcome::Stale { reason: None } => {
                view.on_log(LogLevel::Info, "Disconnected from broker");
            }
            LifecycleOutcome::Ignored => return,
        }

        view.on_connection_changed(self.lifecycle.status(), self.store.is_stale());
    }

    /// Handles one user intent. Refused while disconnected.
    ///
    /// A failed publish is logged and the optimistic update stays in place.
    pub fn handle_intent<T, P>(
        &mut self,
        intent: Intent,
        transport: &mut T,
        view: &mut P,
    ) -> Result<Dispatch, DispatchError>
    where
        T: Transport + ?Sized,
        P: Presentation + ?Sized,
    {
        let dispatch = match dispatch(&mut self.store, self.lifecycle.status(), intent) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                let message = match &e {
                    DispatchError::Refused(_) => "Error: not connected to broker".to_string(),
                    other => format!("Error: {other}"),
                };
                view.on_log(LogLevel::Error, &message);
                return Err(e);
            }
        };

        if let Some(change) = &dispatch.change {
            view.on_device_state_changed(change.device, &change.current);
        }

        let Dispatch { outbound, .. } = &dispatch;
        match transport.publish(outbound.topic, &outbound.payload) {
            Ok(()) => {
                info!("Published {}", outbound);
                view.on_log(LogLevel::Info, &format!("Message sent: {outbound}"));
            }
            Err(e) => {
                warn!("Publish failed, keeping local state: {}", e);
                view.on_log(LogLevel::Error, &format!("Error: {e}"));
            }
        }

        Ok(dispatch)
    }

    /// Initial values again, used when the broker endpoint changes
    pub fn reset<P>(&mut self, view: &mut P)
    where
        P: Presentation + ?Sized,
    {
        self.store.reset();
        self.temperature.clear();
        self.humidity = None;

        for (device, state) in self.store.iter() {
            view.on_device_state_changed(device, &state);
        }
        view.on_telemetry_updated(&[]);
    }

    fn subscribe_all<T, P>(&mut self, transport: &mut T, view: &mut P)
    where
        T: Transport + ?Sized,
        P: Presentation + ?Sized,
    {
        let mut subscribed = Vec::new();
        for topic in self.registry.subscriptions() {
            match transport.subscribe(topic) {
                Ok(()) => subscribed.push(topic),
                Err(e) => {
                    error!("Subscribe failed: {}", e);
                    view.on_log(LogLevel::Error, &format!("Error: {e}"));
                }
            }
        }
        info!("Subscribed to {} topics", subscribed.len());
        view.on_log(
            LogLevel::Info,
            &format!("Subscribed to topics: {}", subscribed.join(", ")),
        );
    }
}

fn label_for(key: TopicKey) -> &'static str {
    match key.route() {
        Route::Power(device) | Route::Level(device) => device.label(),
        Route::AlarmPhase => DeviceId::Alarm.label(),
        Route::Reading(sensor) => sensor.name(),
    }
}
