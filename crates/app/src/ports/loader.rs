//! Component loader port: turns a domain into a component descriptor.

use std::sync::Arc;

use crate::component::ComponentDescriptor;

/// Looks components up by domain.
///
/// How components are discovered is up to the implementation; the
/// bootstrap only relies on this lookup.
pub trait ComponentLoader: Send + Sync {
    /// Return the component registered under `domain`, if any.
    fn get_component(&self, domain: &str) -> Option<Arc<ComponentDescriptor>>;
}
