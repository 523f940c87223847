//! `demo`: pulls in a working set of components without configuring them.
//!
//! The entry point is synchronous and sets up its components through the
//! blocking [`setup_component`](homehub_app::context::SetupContext::setup_component)
//! wrapper.

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_app::context::SetupContext;

pub const DOMAIN: &str = "demo";

/// Components the demo brings up on its own.
pub const DEMO_COMPONENTS: [&str; 1] = [super::http::DOMAIN];

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component() -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .dependency(super::introduction::DOMAIN)
        .setup(|ctx: SetupContext, _config| {
            let config = ctx.configuration();
            let mut ok = true;
            for domain in DEMO_COMPONENTS {
                if !ctx.setup_component(domain, Some(config.clone())) {
                    tracing::warn!(domain, "demo component failed to load");
                    ok = false;
                }
            }
            Ok::<_, BoxError>(ok)
        })
        .build()
}
