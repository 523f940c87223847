//! # homehub-adapter-builtin
//!
//! Components shipped with homehub, registered with the bootstrap through
//! a [`ComponentRegistry`].
//!
//! ## Provided components
//!
//! | Domain | Entry point | Depends on | Requirements |
//! |--------|-------------|------------|--------------|
//! | `logger` | sync | | |
//! | `recorder` | async | | |
//! | `introduction` | sync | | |
//! | `mqtt` | sync | | `paho-mqtt` |
//! | `mqtt_eventstream` | async | `mqtt` | |
//! | `http` | sync | | |
//! | `demo` | sync | `introduction` | |
//!
//! `logger` and `recorder` act on the running process; the daemon hands
//! them what they need through [`BuiltinServices`].
//!
//! ## Dependency rule
//!
//! Depends on `homehub-app` (component model, registry) and
//! `homehub-domain` only.

pub mod components;
mod schema;

use std::sync::Arc;

use homehub_app::component::{ComponentDescriptor, DescriptorError};
use homehub_app::registry::{ComponentRegistry, RegistryError};

use components::{demo, http, introduction, logger, mqtt, mqtt_eventstream, recorder};

pub use components::logger::LogFilter;
pub use components::recorder::EventHistory;

/// Process services the built-in components act on.
#[derive(Clone)]
pub struct BuiltinServices {
    /// Receives the `logger` filter directives.
    pub log_filter: Arc<dyn LogFilter>,
    /// Filled by `recorder`.
    pub history: EventHistory,
}

/// Errors raised while assembling the built-in registry.
#[derive(Debug, thiserror::Error)]
pub enum BuiltinError {
    #[error("invalid built-in component")]
    Descriptor(#[from] DescriptorError),

    #[error("unable to register built-in component")]
    Registry(#[from] RegistryError),
}

/// Every built-in component descriptor.
///
/// # Errors
///
/// Returns [`DescriptorError`] if a descriptor is malformed.
pub fn components(services: &BuiltinServices) -> Result<Vec<ComponentDescriptor>, DescriptorError> {
    Ok(vec![
        logger::component(services.log_filter.clone())?,
        recorder::component(services.history.clone())?,
        introduction::component()?,
        mqtt::component()?,
        mqtt_eventstream::component()?,
        http::component()?,
        demo::component()?,
    ])
}

/// A registry holding every built-in component.
///
/// # Errors
///
/// Returns [`BuiltinError`] if a descriptor is malformed or two share a
/// domain.
pub fn registry(services: &BuiltinServices) -> Result<ComponentRegistry, BuiltinError> {
    Ok(ComponentRegistry::with_components(components(services)?)?)
}
