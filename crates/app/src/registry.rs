//! Component registry: the default [`ComponentLoader`].
//!
//! Components are registered once at process start by the composition
//! root; the bootstrap only ever looks them up.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::component::ComponentDescriptor;
use crate::ports::ComponentLoader;

/// In-memory map of domain → component descriptor.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: RwLock<HashMap<String, Arc<ComponentDescriptor>>>,
}

impl ComponentRegistry {
    /// Create a registry holding `components`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when two components share a domain.
    pub fn with_components<I>(components: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ComponentDescriptor>,
    {
        let registry = Self::default();
        for component in components {
            registry.register(component)?;
        }
        Ok(registry)
    }

    /// Register a component under its domain.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the domain is taken.
    pub fn register(&self, component: ComponentDescriptor) -> Result<(), RegistryError> {
        let mut components = self
            .components
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let domain = component.domain().to_string();
        if components.contains_key(&domain) {
            return Err(RegistryError::Duplicate { domain });
        }
        tracing::debug!(%domain, "registered component");
        components.insert(domain, Arc::new(component));
        Ok(())
    }

    /// Registered domains, sorted.
    #[must_use]
    pub fn domains(&self) -> BTreeSet<String> {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl ComponentLoader for ComponentRegistry {
    fn get_component(&self, domain: &str) -> Option<Arc<ComponentDescriptor>> {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(domain)
            .cloned()
    }
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("component {domain} is already registered")]
    Duplicate { domain: String },
}
