//! Dependency resolver port: computes a component's load order.

use homehub_domain::dependency::LoadOrder;

use crate::ports::ComponentLoader;

/// Computes the ordered, deduplicated transitive dependency closure of a
/// domain.
pub trait DependencyResolver: Send + Sync {
    /// Return every domain that has to be set up for `domain`, each after
    /// its own dependencies, ending with `domain` itself.
    ///
    /// An empty order means the closure could not be computed: a
    /// (sub)dependency is missing or the graph has a cycle.
    fn load_order(&self, loader: &dyn ComponentLoader, domain: &str) -> LoadOrder;
}
