use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::config::MqttConfig;
use super::message_manager::{MQTTMessage, TransportEvent, TransportEventKind};
use crate::sync::{ConnectionEvent, Transport, TransportError};

/// rumqttc rejects shorter keep alive intervals
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Owns the broker client and the task polling its event loop.
///
/// Every call is non-blocking so the UI thread can drive it directly. Events
/// come back through the channel handed to [`MqttHandle::new`].
pub struct MqttHandle {
    runtime: Handle,
    events: mpsc::Sender<TransportEvent>,
    client: Option<AsyncClient>,
    cancel: Option<CancellationToken>,
    generation: u64,
}

impl MqttHandle {
    pub fn new(runtime: Handle, events: mpsc::Sender<TransportEvent>) -> Self {
        MqttHandle {
            runtime,
            events,
            client: None,
            cancel: None,
            generation: 0,
        }
    }

    /// Connection attempt the current client belongs to. Events carrying an
    /// older generation come from a task that is shutting down.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.client.is_some()
    }

    pub fn connect(&mut self, config: &MqttConfig) {
        self.shutdown();
        self.generation += 1;

        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(MIN_KEEP_ALIVE_SECS)));

        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity.max(1));
        let cancel = CancellationToken::new();

        info!("Connecting to {}", config.endpoint());
        self.runtime.spawn(run_event_loop(
            eventloop,
            self.events.clone(),
            cancel.clone(),
            self.generation,
            config.endpoint(),
        ));

        self.client = Some(client);
        self.cancel = Some(cancel);
    }

    pub fn disconnect(&mut self) {
        if self.shutdown() {
            info!("Disconnect requested");
        }
    }

    fn shutdown(&mut self) -> bool {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.try_disconnect() {
                debug!("Could not queue DISCONNECT: {}", e);
            }
        }
        match self.cancel.take() {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn client(&self) -> Result<&AsyncClient, TransportError> {
        self.client.as_ref().ok_or(TransportError::NotConnected)
    }
}

impl Drop for MqttHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Transport for MqttHandle {
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client()?
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| TransportError::Subscribe {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client()?
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| TransportError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

async fn run_event_loop(
    mut eventloop: EventLoop,
    events: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
    generation: u64,
    endpoint: String,
) {
    let emit = |kind: TransportEventKind| TransportEvent { generation, kind };
    let mut connected = false;

    loop {
        let kind = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = events.send(emit(TransportEventKind::Connection(ConnectionEvent::Disconnected))).await;
                break;
            }
            polled = eventloop.poll() => match polled {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected = true;
                    TransportEventKind::Connection(ConnectionEvent::Connected {
                        endpoint: endpoint.clone(),
                    })
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let content = String::from_utf8_lossy(&publish.payload).into_owned();
                    TransportEventKind::Message(MQTTMessage::from_topic(publish.topic, content))
                }
                Ok(event) => {
                    trace!("MQTT event: {:?}", event);
                    continue;
                }
                Err(e) => {
                    let reason = e.to_string();
                    let event = if connected {
                        warn!("Connection to {} lost: {}", endpoint, reason);
                        ConnectionEvent::Lost(reason)
                    } else {
                        error!("Connection to {} failed: {}", endpoint, reason);
                        ConnectionEvent::Failed(reason)
                    };
                    let _ = events.send(emit(TransportEventKind::Connection(event))).await;
                    break;
                }
            }
        };

        if events.send(emit(kind)).await.is_err() {
            debug!("Event receiver dropped, stopping MQTT task");
            break;
        }
    }
}
