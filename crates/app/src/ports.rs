//! Port definitions: traits that collaborators implement.
//!
//! Ports are the boundaries between the bootstrap core and the outside world.
//! They are defined here (in `app`) so that both the orchestration layer and
//! the adapter layer can depend on them without creating circular
//! dependencies. Every port is object safe: the [`SetupContext`] holds them
//! as `Arc<dyn …>`.
//!
//! [`SetupContext`]: crate::context::SetupContext

pub mod config_validator;
pub mod error_reporter;
pub mod event_bus;
pub mod installer;
pub mod loader;
pub mod resolver;

pub use config_validator::ConfigValidator;
pub use error_reporter::ErrorReporter;
pub use event_bus::EventBus;
pub use installer::PackageInstaller;
pub use loader::ComponentLoader;
pub use resolver::DependencyResolver;
