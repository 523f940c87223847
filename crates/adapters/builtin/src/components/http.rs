//! `http`: API server settings.

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_domain::error::ConfigError;
use serde::{Deserialize, Serialize};

use crate::schema::{Section, invalid, typed};

pub const DOMAIN: &str = "http";

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    /// Externally visible URL, derived from host and port when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8123
}

impl HttpConfig {
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server_host, self.server_port))
    }
}

impl Section for HttpConfig {
    fn validate(&self, domain: &str) -> Result<(), ConfigError> {
        if self.server_port == 0 {
            return Err(invalid(domain, "server_port", "must be between 1 and 65535"));
        }
        Ok(())
    }
}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component() -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .config_schema(typed::<HttpConfig>)
        .setup(|_ctx, config| {
            let config: HttpConfig = serde_json::from_value(config)?;
            tracing::info!(base_url = %config.base_url(), "http server configured");
            Ok::<_, BoxError>(true)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_derive_base_url() {
        let config = HttpConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            base_url: None,
        };
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn should_reject_port_zero() {
        let component = component().unwrap();
        let schema = component.config_schema().unwrap();
        let err = schema(DOMAIN, json!({"server_port": 0})).unwrap_err();
        assert!(matches!(err, ConfigError::Schema { ref key, .. } if key == "server_port"));
    }
}
