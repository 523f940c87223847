//! Event: an immutable record of something that happened.
//!
//! The bootstrap publishes an event each time a component comes online,
//! and the daemon publishes start/stop events around the bootstrap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{Timestamp, now};

/// Kind of event carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A component finished setup successfully. Payload: `{"component": domain}`.
    ComponentLoaded,
    /// Every configured component has settled.
    HomehubStart,
    /// The daemon is shutting down.
    HomehubStop,
}

impl EventType {
    /// Wire name of the event type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComponentLoaded => "component_loaded",
            Self::HomehubStart => "homehub_start",
            Self::HomehubStop => "homehub_stop",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            data,
            timestamp: now(),
        }
    }

    /// Event announcing that `domain` is loaded.
    #[must_use]
    pub fn component_loaded(domain: &str) -> Self {
        Self::new(
            EventType::ComponentLoaded,
            serde_json::json!({ "component": domain }),
        )
    }

    /// Domain carried by a `component_loaded` event.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        if self.event_type != EventType::ComponentLoaded {
            return None;
        }
        self.data.get("component").and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_carry_domain_in_component_loaded_payload() {
        let event = Event::component_loaded("mqtt");
        assert_eq!(event.event_type, EventType::ComponentLoaded);
        assert_eq!(event.data, serde_json::json!({"component": "mqtt"}));
        assert_eq!(event.component(), Some("mqtt"));
    }

    #[test]
    fn should_not_expose_component_for_other_events() {
        let event = Event::new(EventType::HomehubStart, serde_json::json!({}));
        assert_eq!(event.component(), None);
    }

    #[test]
    fn should_serialize_event_type_in_snake_case() {
        let json = serde_json::to_string(&EventType::ComponentLoaded).unwrap();
        assert_eq!(json, "\"component_loaded\"");
        assert_eq!(EventType::HomehubStop.to_string(), "homehub_stop");
    }
}
