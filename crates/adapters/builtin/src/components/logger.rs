//! `logger`: per-module log levels.
//!
//! The daemon owns the subscriber; the component only hands it new filter
//! directives through a [`LogFilter`].

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_domain::error::ConfigError;
use serde::{Deserialize, Serialize};

use crate::schema::{Section, invalid, typed};

pub const DOMAIN: &str = "logger";

/// `[logger]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Level applied to every module without an explicit entry.
    #[serde(default = "default_level")]
    pub default: String,
    /// Module path → level.
    #[serde(default)]
    pub logs: BTreeMap<String, String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl LoggerConfig {
    /// Filter directives in `EnvFilter` syntax, e.g. `warn,homehub_app=debug`.
    #[must_use]
    pub fn directives(&self) -> String {
        std::iter::once(self.default.clone())
            .chain(
                self.logs
                    .iter()
                    .map(|(module, level)| format!("{module}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Section for LoggerConfig {
    fn validate(&self, domain: &str) -> Result<(), ConfigError> {
        if tracing::Level::from_str(&self.default).is_err() {
            return Err(invalid(domain, "default", format!("unknown level {:?}", self.default)));
        }
        for (module, level) in &self.logs {
            if tracing::Level::from_str(level).is_err() {
                return Err(invalid(
                    domain,
                    &format!("logs.{module}"),
                    format!("unknown level {level:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Replaces the active log filter of the running subscriber.
pub trait LogFilter: Send + Sync {
    /// Install `directives` (`EnvFilter` syntax) as the new filter.
    ///
    /// # Errors
    ///
    /// Fails when the directives do not parse or the subscriber is gone.
    fn apply(&self, directives: &str) -> Result<(), BoxError>;
}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component(filter: Arc<dyn LogFilter>) -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .config_schema(typed::<LoggerConfig>)
        .setup(move |_ctx, config| {
            let config: LoggerConfig = serde_json::from_value(config)?;
            let directives = config.directives();
            filter.apply(&directives)?;
            tracing::info!(filter = %directives, "log filter replaced");
            Ok::<_, BoxError>(true)
        })
        .build()
}
