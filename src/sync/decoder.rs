//! Inbound message classification
//!
//! Pure functions only. Payloads are matched literally: no trimming, no case
//! folding. Unknown vocabulary is benign ([`Inbound::Unrecognized`]), a broken
//! number is an error ([`DecodeError`]).

use super::device::{AlarmPhase, DeviceId, Power, SensorId};
use super::error::DecodeError;
use super::topics::{Route, TopicKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Reading { sensor: SensorId, value: f64 },
    Power { device: DeviceId, power: Power },
    Level { device: DeviceId, level: u8 },
    Alarm(AlarmPhase),
    Unrecognized { topic: String, payload: String },
}

pub fn decode(topic: &str, payload: &str) -> Result<Inbound, DecodeError> {
    let Some(key) = TopicKey::from_inbound(topic) else {
        return Ok(unrecognized(topic, payload));
    };

    let inbound = match key.route() {
        Route::Reading(sensor) => {
            let value = decode_reading(payload).ok_or_else(|| DecodeError::MalformedReading {
                topic: topic.to_string(),
                payload: payload.to_string(),
            })?;
            Inbound::Reading { sensor, value }
        }
        Route::Power(device) => match decode_power(payload) {
            Some(power) => Inbound::Power { device, power },
            None => unrecognized(topic, payload),
        },
        Route::Level(device) => {
            let level = decode_level(payload).ok_or_else(|| DecodeError::MalformedLevel {
                topic: topic.to_string(),
                payload: payload.to_string(),
            })?;
            Inbound::Level { device, level }
        }
        Route::AlarmPhase => match decode_alarm(payload) {
            Some(phase) => Inbound::Alarm(phase),
            None => unrecognized(topic, payload),
        },
    };

    Ok(inbound)
}

pub fn decode_power(payload: &str) -> Option<Power> {
    match payload {
        "ON" => Some(Power::On),
        "OFF" => Some(Power::Off),
        _ => None,
    }
}

pub fn decode_alarm(payload: &str) -> Option<AlarmPhase> {
    AlarmPhase::ALL
        .into_iter()
        .find(|phase| phase.as_payload() == payload)
}

/// Decimal level string. The 0-100 range is not enforced here.
pub fn decode_level(payload: &str) -> Option<u8> {
    payload.parse().ok()
}

pub fn decode_reading(payload: &str) -> Option<f64> {
    payload.parse().ok()
}

fn unrecognized(topic: &str, payload: &str) -> Inbound {
    Inbound::Unrecognized {
        topic: topic.to_string(),
        payload: payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_payloads_are_exact() {
        for device in [DeviceId::Light1, DeviceId::Light2, DeviceId::Heater, DeviceId::Fan] {
            let topic = device.power_key().inbound();
            assert_eq!(
                decode(topic, "ON").unwrap(),
                Inbound::Power { device, power: Power::On }
            );
            assert_eq!(
                decode(topic, "OFF").unwrap(),
                Inbound::Power { device, power: Power::Off }
            );
            for junk in ["on", "Off", " ON", "ON\n", "", "1"] {
                assert!(matches!(
                    decode(topic, junk).unwrap(),
                    Inbound::Unrecognized { .. }
                ));
            }
        }
    }

    #[test]
    fn alarm_vocabulary_is_total() {
        let expected = [
            ("DESARMADO", AlarmPhase::Disarmed),
            ("ARMANDO", AlarmPhase::Arming),
            ("ARMADO", AlarmPhase::Armed),
            ("IDENTIFICACION", AlarmPhase::Identification),
            ("ACTIVADO", AlarmPhase::Activated),
        ];
        for (payload, phase) in expected {
            assert_eq!(
                decode("smarthome/web/alarma", payload).unwrap(),
                Inbound::Alarm(phase)
            );
        }

        for junk in ["XYZ", "ON", "armado", "ACTIVADO "] {
            assert_eq!(
                decode("smarthome/web/alarma", junk).unwrap(),
                Inbound::Unrecognized {
                    topic: "smarthome/web/alarma".to_string(),
                    payload: junk.to_string(),
                }
            );
        }
    }

    #[test]
    fn readings_parse_floats() {
        assert_eq!(
            decode("smarthome/web/temp", "21.5").unwrap(),
            Inbound::Reading { sensor: SensorId::Temperature, value: 21.5 }
        );
        assert_eq!(
            decode("smarthome/web/hum", "-3").unwrap(),
            Inbound::Reading { sensor: SensorId::Humidity, value: -3.0 }
        );
    }

    #[test]
    fn malformed_reading_fails_closed() {
        let err = decode("smarthome/web/temp", "warm").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedReading {
                topic: "smarthome/web/temp".to_string(),
                payload: "warm".to_string(),
            }
        );
        assert!(decode("smarthome/web/hum", "").is_err());
        assert!(decode("smarthome/web/temp", "21.5C").is_err());
    }

    #[test]
    fn levels_pass_through_without_range_check() {
        assert_eq!(
            decode("smarthome/web/slide1", "42").unwrap(),
            Inbound::Level { device: DeviceId::Light1, level: 42 }
        );
        assert_eq!(
            decode("smarthome/web/slide2", "150").unwrap(),
            Inbound::Level { device: DeviceId::Light2, level: 150 }
        );
        assert!(matches!(
            decode("smarthome/web/slide1", "half"),
            Err(DecodeError::MalformedLevel { .. })
        ));
    }

    #[test]
    fn unknown_topic_is_unrecognized() {
        assert_eq!(
            decode("smarthome/web/garage", "OPEN").unwrap(),
            Inbound::Unrecognized {
                topic: "smarthome/web/garage".to_string(),
                payload: "OPEN".to_string(),
            }
        );
    }
}
