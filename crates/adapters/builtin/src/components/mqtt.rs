//! `mqtt`: broker connection settings shared by MQTT-based components.

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_domain::error::ConfigError;
use serde::{Deserialize, Serialize};

use crate::schema::{Section, invalid, typed};

pub const DOMAIN: &str = "mqtt";

/// Python client the broker bridge runs on.
pub const REQUIREMENT: &str = "paho-mqtt==1.3.1";

/// `[mqtt]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub broker: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Client identifier, generated by the broker when unset.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_port() -> u16 {
    1883
}

fn default_keepalive() -> u16 {
    60
}

impl Section for MqttConfig {
    fn validate(&self, domain: &str) -> Result<(), ConfigError> {
        if self.broker.trim().is_empty() {
            return Err(invalid(domain, "broker", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid(domain, "port", "must be between 1 and 65535"));
        }
        if self.keepalive < 15 {
            return Err(invalid(domain, "keepalive", "must be at least 15 seconds"));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(invalid(domain, "password", "requires a username"));
        }
        Ok(())
    }
}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component() -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .requirement(REQUIREMENT)
        .config_schema(typed::<MqttConfig>)
        .setup(|_ctx, config| {
            let config: MqttConfig = serde_json::from_value(config)?;
            tracing::info!(
                broker = %config.broker,
                port = config.port,
                keepalive = config.keepalive,
                "mqtt broker configured"
            );
            Ok::<_, BoxError>(true)
        })
        .build()
}
