//! Device state store
//!
//! Holds the current state of every device. All writes go through
//! [`DeviceStateStore::apply`]; the other mutating methods only build a
//! [`Mutation`] and hand it over.
//!
//! # Reconciliation
//!
//! ```text
//! user toggle ──► apply_optimistic ──► Mutation::Power (Optimistic) ─┐
//!                                                                    ├──► apply ──► StateChange
//! broker echo ──► apply_inbound ──► decoder ──► Mutation (Broker) ───┘
//! ```
//!
//! The last write wins. A late broker echo may overwrite a newer optimistic
//! toggle until the next status message arrives.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::decoder::{decode, Inbound};
use super::device::{AlarmPhase, DeviceId, DeviceState, Power};
use super::error::SyncError;
use super::topics::TopicKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Status message from the broker
    Broker,
    /// Local user intent, applied before any confirmation
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Power { device: DeviceId, power: Power },
    Level { device: DeviceId, level: u8 },
    Alarm { phase: AlarmPhase },
}

impl Mutation {
    pub const fn device(&self) -> DeviceId {
        match self {
            Mutation::Power { device, .. } | Mutation::Level { device, .. } => *device,
            Mutation::Alarm { .. } => DeviceId::Alarm,
        }
    }

    /// Device update carried by a decoded status message, if any
    pub fn from_inbound(inbound: &Inbound) -> Option<Self> {
        match *inbound {
            Inbound::Power { device, power } => Some(Mutation::Power { device, power }),
            Inbound::Level { device, level } => Some(Mutation::Level { device, level }),
            Inbound::Alarm(phase) => Some(Mutation::Alarm { phase }),
            Inbound::Reading { .. } | Inbound::Unrecognized { .. } => None,
        }
    }
}

/// Previous and new state of one device after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub device: DeviceId,
    pub previous: DeviceState,
    pub current: DeviceState,
    pub origin: Origin,
}

impl StateChange {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    Changed(StateChange),
    /// Payload outside the device vocabulary, state untouched
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct DeviceStateStore {
    states: BTreeMap<DeviceId, DeviceState>,
    stale: bool,
}

impl Default for DeviceStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStateStore {
    pub fn new() -> Self {
        let states = DeviceId::ALL
            .into_iter()
            .map(|id| (id, DeviceState::initial(id.kind())))
            .collect();

        Self {
            states,
            stale: false,
        }
    }

    pub fn get(&self, device: DeviceId) -> DeviceState {
        self.states
            .get(&device)
            .copied()
            .unwrap_or_else(|| DeviceState::initial(device.kind()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, DeviceState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }

    /// Single mutation entry point
    pub fn apply(&mut self, mutation: Mutation, origin: Origin) -> Result<StateChange, SyncError> {
        let device = mutation.device();
        let previous = self.get(device);

        let current = match (previous, mutation) {
            (DeviceState::Switch { .. }, Mutation::Power { power, .. }) => {
                DeviceState::Switch { power }
            }
            (DeviceState::Dimmable { level, .. }, Mutation::Power { power, .. }) => {
                DeviceState::Dimmable { power, level }
            }
            (DeviceState::Dimmable { power, .. }, Mutation::Level { level, .. }) => {
                DeviceState::Dimmable { power, level }
            }
            (DeviceState::Alarm { .. }, Mutation::Alarm { phase }) => DeviceState::Alarm { phase },
            (_, Mutation::Power { .. }) => return Err(unsupported(device, "power")),
            (_, Mutation::Level { .. }) => return Err(unsupported(device, "level")),
            (_, Mutation::Alarm { .. }) => return Err(unsupported(device, "alarm phase")),
        };

        self.states.insert(device, current);

        if previous != current {
            info!("{} changed: {} -> {} ({:?})", device, previous, current, origin);
        } else {
            debug!("{} unchanged at {} ({:?})", device, current, origin);
        }

        Ok(StateChange {
            device,
            previous,
            current,
            origin,
        })
    }

    /// Decodes a status payload for the device behind `key` and applies it.
    pub fn apply_inbound(
        &mut self,
        key: TopicKey,
        payload: &str,
    ) -> Result<InboundOutcome, SyncError> {
        let inbound = decode(key.inbound(), payload)?;

        if let Inbound::Reading { .. } = inbound {
            return Err(SyncError::NotADevice(key));
        }

        match Mutation::from_inbound(&inbound) {
            Some(mutation) => Ok(InboundOutcome::Changed(self.apply(mutation, Origin::Broker)?)),
            None => {
                debug!("Unrecognized status for {}: {:?}", key, payload);
                Ok(InboundOutcome::Unrecognized)
            }
        }
    }

    /// Flips power locally and returns the payload to publish.
    ///
    /// Not rolled back if the publish fails or no echo arrives.
    pub fn apply_optimistic(
        &mut self,
        device: DeviceId,
    ) -> Result<(StateChange, &'static str), SyncError> {
        let power = self
            .get(device)
            .power()
            .ok_or_else(|| unsupported(device, "toggle"))?
            .toggled();

        let change = self.apply(Mutation::Power { device, power }, Origin::Optimistic)?;
        Ok((change, power.as_payload()))
    }

    /// Sets a dimmer level locally, clamped to 100, and returns the payload.
    pub fn set_level(&mut self, device: DeviceId, level: u8) -> Result<(StateChange, String), SyncError> {
        let level = level.min(MAX_LEVEL);
        let change = self.apply(Mutation::Level { device, level }, Origin::Optimistic)?;
        Ok((change, level.to_string()))
    }

    pub fn mark_stale(&mut self) {
        if !self.stale {
            debug!("Device states marked stale");
        }
        self.stale = true;
    }

    pub fn mark_fresh(&mut self) {
        self.stale = false;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Back to initial values, keeping the stale flag
    pub fn reset(&mut self) {
        for (id, state) in self.states.iter_mut() {
            *state = DeviceState::initial(id.kind());
        }
    }
}

pub const MAX_LEVEL: u8 = 100;

fn unsupported(device: DeviceId, operation: &'static str) -> SyncError {
    SyncError::Unsupported { device, operation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::error::DecodeError;

    #[test]
    fn starts_with_initial_states() {
        let store = DeviceStateStore::new();
        assert_eq!(store.iter().count(), DeviceId::ALL.len());
        assert_eq!(store.get(DeviceId::Fan), DeviceState::Switch { power: Power::Off });
        assert_eq!(store.get(DeviceId::Alarm).phase(), Some(AlarmPhase::Disarmed));
        assert!(!store.is_stale());
    }

    #[test]
    fn inbound_power_replaces_flag_only() {
        let mut store = DeviceStateStore::new();
        store.set_level(DeviceId::Light1, 70).unwrap();

        let outcome = store.apply_inbound(TopicKey::Luz1, "ON").unwrap();
        let InboundOutcome::Changed(change) = outcome else {
            panic!("expected a change, got {outcome:?}");
        };
        assert_eq!(change.previous, DeviceState::Dimmable { power: Power::Off, level: 70 });
        assert_eq!(change.current, DeviceState::Dimmable { power: Power::On, level: 70 });
        assert_eq!(change.origin, Origin::Broker);
    }

    #[test]
    fn inbound_level_keeps_power_flag() {
        let mut store = DeviceStateStore::new();
        store.apply_inbound(TopicKey::Luz2, "ON").unwrap();
        store.apply_inbound(TopicKey::Slide2, "35").unwrap();
        assert_eq!(
            store.get(DeviceId::Light2),
            DeviceState::Dimmable { power: Power::On, level: 35 }
        );
    }

    #[test]
    fn unrecognized_payloads_never_mutate() {
        let mut store = DeviceStateStore::new();
        store.apply_inbound(TopicKey::Caloventor, "ON").unwrap();
        let before = store.get(DeviceId::Heater);

        for _ in 0..3 {
            assert_eq!(
                store.apply_inbound(TopicKey::Caloventor, "MAYBE").unwrap(),
                InboundOutcome::Unrecognized
            );
        }
        assert_eq!(store.get(DeviceId::Heater), before);
    }

    #[test]
    fn malformed_level_is_a_decode_error() {
        let mut store = DeviceStateStore::new();
        let err = store.apply_inbound(TopicKey::Slide1, "bright").unwrap_err();
        assert!(matches!(err, SyncError::Decode(DecodeError::MalformedLevel { .. })));
        assert_eq!(store.get(DeviceId::Light1).level(), Some(0));
    }

    #[test]
    fn sensor_topics_are_rejected() {
        let mut store = DeviceStateStore::new();
        assert_eq!(
            store.apply_inbound(TopicKey::Temp, "20.0").unwrap_err(),
            SyncError::NotADevice(TopicKey::Temp)
        );
    }

    #[test]
    fn optimistic_toggle_flips_once_per_call() {
        let mut store = DeviceStateStore::new();

        let (change, payload) = store.apply_optimistic(DeviceId::Fan).unwrap();
        assert_eq!(payload, "ON");
        assert_eq!(change.previous.power(), Some(Power::Off));
        assert_eq!(change.current.power(), Some(Power::On));
        assert_eq!(change.origin, Origin::Optimistic);

        let (_, payload) = store.apply_optimistic(DeviceId::Fan).unwrap();
        assert_eq!(payload, "OFF");
        assert_eq!(store.get(DeviceId::Fan).power(), Some(Power::Off));
    }

    #[test]
    fn optimistic_toggle_follows_latest_broker_state() {
        let mut store = DeviceStateStore::new();
        store.apply_optimistic(DeviceId::Heater).unwrap();
        // late echo overwrites the optimistic value
        store.apply_inbound(TopicKey::Caloventor, "OFF").unwrap();

        let (_, payload) = store.apply_optimistic(DeviceId::Heater).unwrap();
        assert_eq!(payload, "ON");
    }

    #[test]
    fn alarm_has_no_optimistic_toggle() {
        let mut store = DeviceStateStore::new();
        let err = store.apply_optimistic(DeviceId::Alarm).unwrap_err();
        assert_eq!(
            err,
            SyncError::Unsupported { device: DeviceId::Alarm, operation: "toggle" }
        );
        assert_eq!(store.get(DeviceId::Alarm).phase(), Some(AlarmPhase::Disarmed));
    }

    #[test]
    fn set_level_is_idempotent() {
        let mut store = DeviceStateStore::new();
        let (first, payload_a) = store.set_level(DeviceId::Light1, 55).unwrap();
        let (second, payload_b) = store.set_level(DeviceId::Light1, 55).unwrap();

        assert_eq!(payload_a, "55");
        assert_eq!(payload_a, payload_b);
        assert!(!first.is_noop());
        assert!(second.is_noop());
        assert_eq!(store.get(DeviceId::Light1).level(), Some(55));
    }

    #[test]
    fn outbound_level_is_clamped() {
        let mut store = DeviceStateStore::new();
        let (change, payload) = store.set_level(DeviceId::Light2, 250).unwrap();
        assert_eq!(payload, "100");
        assert_eq!(change.current.level(), Some(MAX_LEVEL));
    }

    #[test]
    fn level_on_switch_is_rejected() {
        let mut store = DeviceStateStore::new();
        assert!(store.set_level(DeviceId::Heater, 10).is_err());
        assert_eq!(store.get(DeviceId::Heater), DeviceState::Switch { power: Power::Off });
    }

    #[test]
    fn stale_flag_keeps_values() {
        let mut store = DeviceStateStore::new();
        store.apply_inbound(TopicKey::Alarma, "ARMADO").unwrap();
        store.mark_stale();

        assert!(store.is_stale());
        assert_eq!(store.get(DeviceId::Alarm).phase(), Some(AlarmPhase::Armed));

        store.mark_fresh();
        assert!(!store.is_stale());
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut store = DeviceStateStore::new();
        store.apply_inbound(TopicKey::Ventilador, "ON").unwrap();
        store.set_level(DeviceId::Light2, 80).unwrap();
        store.reset();

        for (id, state) in store.iter() {
            assert_eq!(state, DeviceState::initial(id.kind()));
        }
    }
}
