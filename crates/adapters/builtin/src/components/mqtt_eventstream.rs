//! `mqtt_eventstream`: forwards bus events to another instance over MQTT.

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_domain::error::ConfigError;
use serde::{Deserialize, Serialize};

use crate::schema::{Section, invalid, typed};

pub const DOMAIN: &str = "mqtt_eventstream";

/// `[mqtt_eventstream]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventstreamConfig {
    /// Topic local events are published on.
    #[serde(default)]
    pub publish_topic: Option<String>,
    /// Topic remote events are read from.
    #[serde(default)]
    pub subscribe_topic: Option<String>,
}

impl Section for EventstreamConfig {
    fn validate(&self, domain: &str) -> Result<(), ConfigError> {
        for (key, topic) in [
            ("publish_topic", &self.publish_topic),
            ("subscribe_topic", &self.subscribe_topic),
        ] {
            if topic.as_deref().is_some_and(|t| t.contains(['+', '#'])) {
                return Err(invalid(domain, key, "wildcards are not allowed"));
            }
        }
        Ok(())
    }
}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component() -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .dependency(super::mqtt::DOMAIN)
        .config_schema(typed::<EventstreamConfig>)
        .async_setup(|_ctx, config| async move {
            let config: EventstreamConfig = serde_json::from_value(config)?;
            tracing::info!(
                publish = config.publish_topic.as_deref().unwrap_or("-"),
                subscribe = config.subscribe_topic.as_deref().unwrap_or("-"),
                "event stream bridged"
            );
            Ok::<_, BoxError>(true)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_depend_on_mqtt() {
        assert_eq!(component().unwrap().dependencies().as_slice(), ["mqtt"]);
    }

    #[test]
    fn should_reject_wildcard_publish_topic() {
        let component = component().unwrap();
        let schema = component.config_schema().unwrap();
        let err = schema(DOMAIN, json!({"publish_topic": "home/#"})).unwrap_err();
        assert!(matches!(err, ConfigError::Schema { ref key, .. } if key == "publish_topic"));
    }
}
