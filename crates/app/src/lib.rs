//! # homehub-app
//!
//! Application layer: the component bootstrap and its **port definitions**.
//!
//! ## Responsibilities
//! - Define **port traits** the bootstrap consumes from collaborators:
//!   - `ComponentLoader`: domain → component descriptor
//!   - `DependencyResolver`: domain → ordered dependency closure
//!   - `ConfigValidator`: full configuration → validated component slice
//!   - `ErrorReporter`: surface "setup failed for domain" notifications
//!   - `PackageInstaller`: install one requirement into a target directory
//!   - `EventBus`: publish events
//! - Own the process-wide [`SetupContext`](context::SetupContext):
//!   setup-task cache, loaded set, install lock, merged configuration
//! - Run component setup at most once per domain, dependencies first,
//!   requirements installed off the scheduler, failures kept local
//! - Schedule configured domains in two stages
//! - Provide **in-process defaults** for the ports that don't need IO
//!
//! ## Dependency rule
//! Depends on `homehub-domain` only (plus `tokio` and `futures`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bootstrap;
pub mod component;
pub mod context;
pub mod event_bus;
pub mod notifier;
pub mod ports;
pub mod registry;
pub mod requirements;
pub mod resolver;
pub mod setup;
pub mod task;
pub mod validation;
