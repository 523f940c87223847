//! Config validator port: extracts and validates a component's slice.

use homehub_domain::config::Configuration;
use homehub_domain::error::ConfigError;

use crate::component::ComponentDescriptor;

/// Validates and normalizes the configuration slice of one component.
pub trait ConfigValidator: Send + Sync {
    /// Return the validated slice of `config` that belongs to `component`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the slice is malformed; the component
    /// is then not set up.
    fn process_component_config(
        &self,
        component: &ComponentDescriptor,
        config: &Configuration,
    ) -> Result<serde_json::Value, ConfigError>;
}
