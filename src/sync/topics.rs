//! Static topic registry
//!
//! Status flows broker -> dashboard on `smarthome/web/<key>`, commands flow
//! dashboard -> board on `smarthome/esp32/<key>`. Lookups are exact and
//! case-sensitive.

use std::fmt;

use tracing::debug;

use super::device::{DeviceId, SensorId};
use super::error::SyncError;

pub const INBOUND_PREFIX: &str = "smarthome/web";
pub const OUTBOUND_PREFIX: &str = "smarthome/esp32";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopicKey {
    Temp,
    Hum,
    Luz1,
    Luz2,
    Slide1,
    Slide2,
    Caloventor,
    Ventilador,
    Alarma,
}

/// What a topic carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Reading(SensorId),
    Power(DeviceId),
    Level(DeviceId),
    AlarmPhase,
}

impl TopicKey {
    pub const ALL: [TopicKey; 9] = [
        TopicKey::Temp,
        TopicKey::Hum,
        TopicKey::Luz1,
        TopicKey::Luz2,
        TopicKey::Slide1,
        TopicKey::Slide2,
        TopicKey::Caloventor,
        TopicKey::Ventilador,
        TopicKey::Alarma,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            TopicKey::Temp => "temp",
            TopicKey::Hum => "hum",
            TopicKey::Luz1 => "luz1",
            TopicKey::Luz2 => "luz2",
            TopicKey::Slide1 => "slide1",
            TopicKey::Slide2 => "slide2",
            TopicKey::Caloventor => "caloventor",
            TopicKey::Ventilador => "ventilador",
            TopicKey::Alarma => "alarma",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub const fn inbound(self) -> &'static str {
        match self {
            TopicKey::Temp => "smarthome/web/temp",
            TopicKey::Hum => "smarthome/web/hum",
            TopicKey::Luz1 => "smarthome/web/luz1",
            TopicKey::Luz2 => "smarthome/web/luz2",
            TopicKey::Slide1 => "smarthome/web/slide1",
            TopicKey::Slide2 => "smarthome/web/slide2",
            TopicKey::Caloventor => "smarthome/web/caloventor",
            TopicKey::Ventilador => "smarthome/web/ventilador",
            TopicKey::Alarma => "smarthome/web/alarma",
        }
    }

    /// Command topic. Sensors are read-only and have none.
    pub const fn outbound(self) -> Option<&'static str> {
        match self {
            TopicKey::Temp | TopicKey::Hum => None,
            TopicKey::Luz1 => Some("smarthome/esp32/luz1"),
            TopicKey::Luz2 => Some("smarthome/esp32/luz2"),
            TopicKey::Slide1 => Some("smarthome/esp32/slide1"),
            TopicKey::Slide2 => Some("smarthome/esp32/slide2"),
            TopicKey::Caloventor => Some("smarthome/esp32/caloventor"),
            TopicKey::Ventilador => Some("smarthome/esp32/ventilador"),
            TopicKey::Alarma => Some("smarthome/esp32/alarma"),
        }
    }

    pub fn from_inbound(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.inbound() == topic)
    }

    pub fn from_outbound(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.outbound() == Some(topic))
    }

    pub const fn route(self) -> Route {
        match self {
            TopicKey::Temp => Route::Reading(SensorId::Temperature),
            TopicKey::Hum => Route::Reading(SensorId::Humidity),
            TopicKey::Luz1 => Route::Power(DeviceId::Light1),
            TopicKey::Luz2 => Route::Power(DeviceId::Light2),
            TopicKey::Slide1 => Route::Level(DeviceId::Light1),
            TopicKey::Slide2 => Route::Level(DeviceId::Light2),
            TopicKey::Caloventor => Route::Power(DeviceId::Heater),
            TopicKey::Ventilador => Route::Power(DeviceId::Fan),
            TopicKey::Alarma => Route::AlarmPhase,
        }
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Set of inbound topics the session subscribes to on every connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRegistry {
    subscriptions: Vec<TopicKey>,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::all()
    }
}

impl TopicRegistry {
    pub fn all() -> Self {
        Self {
            subscriptions: TopicKey::ALL.to_vec(),
        }
    }

    /// Builds the subscription set from configured key names.
    ///
    /// Unknown keys are a configuration error and are reported at startup.
    pub fn from_keys<I, S>(keys: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut subscriptions = Vec::new();
        for key in keys {
            let key = key.as_ref();
            let topic_key =
                TopicKey::from_key(key).ok_or_else(|| SyncError::UnknownTopicKey(key.to_string()))?;
            if !subscriptions.contains(&topic_key) {
                subscriptions.push(topic_key);
            }
        }
        debug!("Topic registry built with {} subscriptions", subscriptions.len());
        Ok(Self { subscriptions })
    }

    pub fn keys(&self) -> &[TopicKey] {
        &self.subscriptions
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.subscriptions.iter().map(|k| k.inbound())
    }

    pub fn contains(&self, key: TopicKey) -> bool {
        self.subscriptions.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_follow_prefix_pattern() {
        for key in TopicKey::ALL {
            assert_eq!(key.inbound(), format!("{}/{}", INBOUND_PREFIX, key.key()));
            if let Some(out) = key.outbound() {
                assert_eq!(out, format!("{}/{}", OUTBOUND_PREFIX, key.key()));
            }
        }
        assert_eq!(TopicKey::Temp.outbound(), None);
        assert_eq!(TopicKey::Hum.outbound(), None);
    }

    #[test]
    fn reverse_lookup_is_exact() {
        assert_eq!(TopicKey::from_inbound("smarthome/web/luz1"), Some(TopicKey::Luz1));
        assert_eq!(
            TopicKey::from_outbound("smarthome/esp32/slide2"),
            Some(TopicKey::Slide2)
        );
        assert_eq!(TopicKey::from_inbound("smarthome/web/LUZ1"), None);
        assert_eq!(TopicKey::from_inbound("smarthome/web/luz1/"), None);
        assert_eq!(TopicKey::from_inbound("smarthome/esp32/luz1"), None);
        assert_eq!(TopicKey::from_outbound("smarthome/esp32/temp"), None);
    }

    #[test]
    fn routes() {
        assert_eq!(TopicKey::Slide1.route(), Route::Level(DeviceId::Light1));
        assert_eq!(TopicKey::Caloventor.route(), Route::Power(DeviceId::Heater));
        assert_eq!(TopicKey::Hum.route(), Route::Reading(SensorId::Humidity));
        assert_eq!(TopicKey::Alarma.route(), Route::AlarmPhase);
    }

    #[test]
    fn registry_rejects_unknown_keys() {
        let err = TopicRegistry::from_keys(["temp", "luz3"]).unwrap_err();
        assert_eq!(err, SyncError::UnknownTopicKey("luz3".to_string()));
    }

    #[test]
    fn registry_deduplicates_keys() {
        let registry = TopicRegistry::from_keys(["temp", "alarma", "temp"]).unwrap();
        assert_eq!(registry.keys(), &[TopicKey::Temp, TopicKey::Alarma]);
        let topics: Vec<_> = registry.subscriptions().collect();
        assert_eq!(topics, vec!["smarthome/web/temp", "smarthome/web/alarma"]);
    }

    #[test]
    fn default_registry_subscribes_everything() {
        assert_eq!(TopicRegistry::default().subscriptions().count(), TopicKey::ALL.len());
    }
}
