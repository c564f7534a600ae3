//! Device identifiers and per-kind state
//!
//! Three device kinds share one model:
//!
//! ```text
//! Switch   (heater, fan)      -> power
//! Dimmable (light1, light2)   -> power + level (independent of each other)
//! Alarm    (alarm)            -> phase
//! ```

use std::fmt;

use super::topics::TopicKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceId {
    Light1,
    Light2,
    Heater,
    Fan,
    Alarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Switch,
    Dimmable,
    Alarm,
}

impl DeviceId {
    pub const ALL: [DeviceId; 5] = [
        DeviceId::Light1,
        DeviceId::Light2,
        DeviceId::Heater,
        DeviceId::Fan,
        DeviceId::Alarm,
    ];

    pub const fn kind(self) -> DeviceKind {
        match self {
            DeviceId::Light1 | DeviceId::Light2 => DeviceKind::Dimmable,
            DeviceId::Heater | DeviceId::Fan => DeviceKind::Switch,
            DeviceId::Alarm => DeviceKind::Alarm,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DeviceId::Light1 => "light1",
            DeviceId::Light2 => "light2",
            DeviceId::Heater => "heater",
            DeviceId::Fan => "fan",
            DeviceId::Alarm => "alarm",
        }
    }

    /// Human readable label for the dashboard
    pub const fn label(self) -> &'static str {
        match self {
            DeviceId::Light1 => "Light 1",
            DeviceId::Light2 => "Light 2",
            DeviceId::Heater => "Heater",
            DeviceId::Fan => "Fan",
            DeviceId::Alarm => "Alarm",
        }
    }

    /// Topic key carrying ON/OFF for this device (the alarm key carries phases inbound)
    pub const fn power_key(self) -> TopicKey {
        match self {
            DeviceId::Light1 => TopicKey::Luz1,
            DeviceId::Light2 => TopicKey::Luz2,
            DeviceId::Heater => TopicKey::Caloventor,
            DeviceId::Fan => TopicKey::Ventilador,
            DeviceId::Alarm => TopicKey::Alarma,
        }
    }

    pub const fn level_key(self) -> Option<TopicKey> {
        match self {
            DeviceId::Light1 => Some(TopicKey::Slide1),
            DeviceId::Light2 => Some(TopicKey::Slide2),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Power {
    On,
    #[default]
    Off,
}

impl Power {
    pub const fn toggled(self) -> Self {
        match self {
            Power::On => Power::Off,
            Power::Off => Power::On,
        }
    }

    pub const fn as_payload(self) -> &'static str {
        match self {
            Power::On => "ON",
            Power::Off => "OFF",
        }
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Power::On)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_payload())
    }
}

/// Alarm phases as reported by the controller board. All transitions are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmPhase {
    #[default]
    Disarmed,
    Arming,
    Armed,
    Identification,
    Activated,
}

impl AlarmPhase {
    pub const ALL: [AlarmPhase; 5] = [
        AlarmPhase::Disarmed,
        AlarmPhase::Arming,
        AlarmPhase::Armed,
        AlarmPhase::Identification,
        AlarmPhase::Activated,
    ];

    pub const fn as_payload(self) -> &'static str {
        match self {
            AlarmPhase::Disarmed => "DESARMADO",
            AlarmPhase::Arming => "ARMANDO",
            AlarmPhase::Armed => "ARMADO",
            AlarmPhase::Identification => "IDENTIFICACION",
            AlarmPhase::Activated => "ACTIVADO",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AlarmPhase::Disarmed => "Disarmed",
            AlarmPhase::Arming => "Arming",
            AlarmPhase::Armed => "Armed",
            AlarmPhase::Identification => "Identification",
            AlarmPhase::Activated => "Activated",
        }
    }
}

impl fmt::Display for AlarmPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Switch { power: Power },
    Dimmable { power: Power, level: u8 },
    Alarm { phase: AlarmPhase },
}

impl DeviceState {
    /// State assumed until the first authoritative message arrives
    pub const fn initial(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Switch => DeviceState::Switch { power: Power::Off },
            DeviceKind::Dimmable => DeviceState::Dimmable {
                power: Power::Off,
                level: 0,
            },
            DeviceKind::Alarm => DeviceState::Alarm {
                phase: AlarmPhase::Disarmed,
            },
        }
    }

    pub const fn power(&self) -> Option<Power> {
        match self {
            DeviceState::Switch { power } | DeviceState::Dimmable { power, .. } => Some(*power),
            DeviceState::Alarm { .. } => None,
        }
    }

    pub const fn level(&self) -> Option<u8> {
        match self {
            DeviceState::Dimmable { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub const fn phase(&self) -> Option<AlarmPhase> {
        match self {
            DeviceState::Alarm { phase } => Some(*phase),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceState::Switch { power } => write!(f, "{power}"),
            DeviceState::Dimmable { power, level } => write!(f, "{power} @ {level}%"),
            DeviceState::Alarm { phase } => write!(f, "{phase}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    Temperature,
    Humidity,
}

impl SensorId {
    pub const fn name(self) -> &'static str {
        match self {
            SensorId::Temperature => "temperature",
            SensorId::Humidity => "humidity",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_device_table() {
        assert_eq!(DeviceId::Light1.kind(), DeviceKind::Dimmable);
        assert_eq!(DeviceId::Light2.kind(), DeviceKind::Dimmable);
        assert_eq!(DeviceId::Heater.kind(), DeviceKind::Switch);
        assert_eq!(DeviceId::Fan.kind(), DeviceKind::Switch);
        assert_eq!(DeviceId::Alarm.kind(), DeviceKind::Alarm);
    }

    #[test]
    fn initial_states() {
        assert_eq!(
            DeviceState::initial(DeviceKind::Dimmable),
            DeviceState::Dimmable { power: Power::Off, level: 0 }
        );
        assert_eq!(
            DeviceState::initial(DeviceKind::Alarm).phase(),
            Some(AlarmPhase::Disarmed)
        );
        assert_eq!(DeviceState::initial(DeviceKind::Switch).power(), Some(Power::Off));
        assert_eq!(DeviceState::initial(DeviceKind::Switch).level(), None);
    }

    #[test]
    fn power_toggle_and_payload() {
        assert_eq!(Power::Off.toggled(), Power::On);
        assert_eq!(Power::On.toggled().as_payload(), "OFF");
    }
}
