use chrono::NaiveDateTime;
use std::fmt;

use crate::sync::ConnectionEvent;

const PREVIEW_CHARS: usize = 24;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MQTTMessage {
    pub topic: String,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

impl fmt::Display for MQTTMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let preview: String = self.content.chars().take(PREVIEW_CHARS).collect();
        write!(f, "{} - {}: {}", self.timestamp, self.topic, preview)
    }
}

impl MQTTMessage {
    pub fn from_topic(topic: String, content: String) -> Self {
        MQTTMessage {
            topic,
            content,
            timestamp: chrono::Local::now().naive_local(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}\n{}", self.timestamp, self.topic, self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Connection(ConnectionEvent),
    Message(MQTTMessage),
}

/// Event from the MQTT task, tagged with the connection attempt it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncates_long_payloads() {
        let msg = MQTTMessage::from_topic(
            "smarthome/web/temp".to_string(),
            "x".repeat(100),
        );
        let shown = msg.to_string();
        assert!(shown.ends_with(&"x".repeat(PREVIEW_CHARS)));
        assert!(!shown.contains(&"x".repeat(PREVIEW_CHARS + 1)));
    }

    #[test]
    fn display_handles_short_payloads() {
        let msg = MQTTMessage::from_topic("smarthome/web/luz1".to_string(), "ON".to_string());
        assert!(msg.to_string().ends_with("smarthome/web/luz1: ON"));
        assert!(msg.render().ends_with("smarthome/web/luz1\nON"));
    }
}
