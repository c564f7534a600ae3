//! Command dispatcher
//!
//! Turns a user intent into one outbound message plus the optimistic store
//! update. The connection check lives here so no caller can skip it.

use std::fmt;

use tracing::{debug, warn};

use super::device::{AlarmPhase, DeviceId, DeviceKind, Power};
use super::error::{DispatchError, SyncError};
use super::lifecycle::ConnectionStatus;
use super::store::{DeviceStateStore, StateChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Button press. For the alarm this is an arm/disarm request.
    Toggle(DeviceId),
    /// Slider drag on a dimmable light
    SetLevel { device: DeviceId, level: u8 },
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Intent::Toggle(device) => write!(f, "toggle {device}"),
            Intent::SetLevel { device, level } => write!(f, "set {device} level to {level}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub topic: &'static str,
    pub payload: String,
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.topic, self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub outbound: Outbound,
    /// Local update applied before publishing, none for alarm requests
    pub change: Option<StateChange>,
}

pub fn dispatch(
    store: &mut DeviceStateStore,
    status: ConnectionStatus,
    intent: Intent,
) -> Result<Dispatch, DispatchError> {
    if status != ConnectionStatus::Connected {
        warn!("Refusing {} while disconnected", intent);
        return Err(DispatchError::Refused(intent));
    }

    let dispatch = match intent {
        Intent::Toggle(device) if device.kind() == DeviceKind::Alarm => {
            // arm from Disarmed, otherwise ask the board to disarm
            let phase = store.get(device).phase().unwrap_or_default();
            let request = match phase {
                AlarmPhase::Disarmed => Power::On,
                _ => Power::Off,
            };
            Dispatch {
                outbound: Outbound {
                    topic: command_topic(device.power_key().outbound(), device)?,
                    payload: request.as_payload().to_string(),
                },
                change: None,
            }
        }
        Intent::Toggle(device) => {
            let topic = command_topic(device.power_key().outbound(), device)?;
            let (change, payload) = store.apply_optimistic(device)?;
            Dispatch {
                outbound: Outbound {
                    topic,
                    payload: payload.to_string(),
                },
                change: Some(change),
            }
        }
        Intent::SetLevel { device, level } => {
            let key = device.level_key().ok_or(SyncError::Unsupported {
                device,
                operation: "level",
            })?;
            let topic = command_topic(key.outbound(), device)?;
            let (change, payload) = store.set_level(device, level)?;
            Dispatch {
                outbound: Outbound { topic, payload },
                change: Some(change),
            }
        }
    };

    debug!("Dispatching {} as {}", intent, dispatch.outbound);
    Ok(dispatch)
}

fn command_topic(topic: Option<&'static str>, device: DeviceId) -> Result<&'static str, SyncError> {
    topic.ok_or(SyncError::Unsupported {
        device,
        operation: "command",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::device::DeviceState;
    use crate::sync::topics::TopicKey;

    #[test]
    fn toggle_publishes_new_power_state() {
        let mut store = DeviceStateStore::new();
        let dispatch = dispatch(
            &mut store,
            ConnectionStatus::Connected,
            Intent::Toggle(DeviceId::Light2),
        )
        .unwrap();

        assert_eq!(
            dispatch.outbound,
            Outbound {
                topic: "smarthome/esp32/luz2",
                payload: "ON".to_string(),
            }
        );
        assert_eq!(store.get(DeviceId::Light2).power(), Some(Power::On));
    }

    #[test]
    fn heater_and_fan_use_their_own_topics() {
        let mut store = DeviceStateStore::new();
        let heater = dispatch(&mut store, ConnectionStatus::Connected, Intent::Toggle(DeviceId::Heater)).unwrap();
        let fan = dispatch(&mut store, ConnectionStatus::Connected, Intent::Toggle(DeviceId::Fan)).unwrap();
        assert_eq!(heater.outbound.topic, "smarthome/esp32/caloventor");
        assert_eq!(fan.outbound.topic, "smarthome/esp32/ventilador");
    }

    #[test]
    fn slider_publishes_level() {
        let mut store = DeviceStateStore::new();
        let dispatch = dispatch(
            &mut store,
            ConnectionStatus::Connected,
            Intent::SetLevel { device: DeviceId::Light1, level: 64 },
        )
        .unwrap();

        assert_eq!(dispatch.outbound.topic, "smarthome/esp32/slide1");
        assert_eq!(dispatch.outbound.payload, "64");
        assert_eq!(store.get(DeviceId::Light1).level(), Some(64));
    }

    #[test]
    fn refused_while_disconnected() {
        let mut store = DeviceStateStore::new();
        store.apply_inbound(TopicKey::Luz1, "ON").unwrap();
        let before: Vec<_> = store.iter().collect();

        for intent in [
            Intent::Toggle(DeviceId::Light1),
            Intent::Toggle(DeviceId::Alarm),
            Intent::SetLevel { device: DeviceId::Light1, level: 10 },
        ] {
            let err = dispatch(&mut store, ConnectionStatus::Disconnected, intent).unwrap_err();
            assert_eq!(err, DispatchError::Refused(intent));
        }

        let after: Vec<_> = store.iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn alarm_request_does_not_touch_state() {
        let mut store = DeviceStateStore::new();

        let arm = dispatch(&mut store, ConnectionStatus::Connected, Intent::Toggle(DeviceId::Alarm)).unwrap();
        assert_eq!(arm.outbound.topic, "smarthome/esp32/alarma");
        assert_eq!(arm.outbound.payload, "ON");
        assert_eq!(arm.change, None);
        assert_eq!(store.get(DeviceId::Alarm), DeviceState::Alarm { phase: AlarmPhase::Disarmed });

        store.apply_inbound(TopicKey::Alarma, "ACTIVADO").unwrap();
        let disarm = dispatch(&mut store, ConnectionStatus::Connected, Intent::Toggle(DeviceId::Alarm)).unwrap();
        assert_eq!(disarm.outbound.payload, "OFF");
        assert_eq!(store.get(DeviceId::Alarm).phase(), Some(AlarmPhase::Activated));
    }

    #[test]
    fn level_on_switch_is_unsupported() {
        let mut store = DeviceStateStore::new();
        let err = dispatch(
            &mut store,
            ConnectionStatus::Connected,
            Intent::SetLevel { device: DeviceId::Fan, level: 3 },
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::Sync(SyncError::Unsupported { .. })));
    }
}
