//! Smart home MQTT bridge
//!
//! Mirrors the state of an ESP32 controlled house (lights, heater, fan,
//! alarm, temperature and humidity) from an MQTT broker into a desktop
//! dashboard and publishes the user's commands back.

pub mod config;
pub mod mqtt;
pub mod sync;
pub mod ui;
