//! Dependency graph resolver: the default [`DependencyResolver`].
//!
//! Walks declared dependencies depth-first through the loader. A domain is
//! `loading` while its dependencies are being walked and `loaded` once they
//! all are; meeting a `loading` domain again means the graph has a cycle.

use homehub_domain::dependency::LoadOrder;

use crate::ports::{ComponentLoader, DependencyResolver};

/// Resolves the load order by walking the component graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphResolver;

/// Why a load order could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolveError {
    NotFound { domain: String },
    Circular { from: String, to: String },
}

impl DependencyResolver for GraphResolver {
    fn load_order(&self, loader: &dyn ComponentLoader, domain: &str) -> LoadOrder {
        let mut loading = Vec::new();
        let mut loaded = LoadOrder::new();
        match walk(loader, domain, &mut loading, &mut loaded) {
            Ok(()) => loaded,
            Err(ResolveError::NotFound { domain: missing }) => {
                tracing::error!(
                    domain,
                    missing = %missing,
                    "unable to resolve dependencies: unable to resolve (sub)dependency"
                );
                LoadOrder::new()
            }
            Err(ResolveError::Circular { from, to }) => {
                tracing::error!(
                    domain,
                    "unable to resolve dependencies: circular dependency {from} -> {to}"
                );
                LoadOrder::new()
            }
        }
    }
}

fn walk(
    loader: &dyn ComponentLoader,
    domain: &str,
    loading: &mut Vec<String>,
    loaded: &mut LoadOrder,
) -> Result<(), ResolveError> {
    let component = loader
        .get_component(domain)
        .ok_or_else(|| ResolveError::NotFound {
            domain: domain.to_string(),
        })?;

    loading.push(domain.to_string());
    for dep in component.dependencies() {
        if loaded.contains(dep) {
            continue;
        }
        if loading.contains(dep) {
            return Err(ResolveError::Circular {
                from: domain.to_string(),
                to: dep.clone(),
            });
        }
        walk(loader, dep, loading, loaded)?;
    }
    loading.pop();
    loaded.push(domain);
    Ok(())
}
