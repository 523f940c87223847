//! `introduction`: greets a new installation in the log.

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use serde::{Deserialize, Serialize};

use crate::schema::{Section, typed};

pub const DOMAIN: &str = "introduction";

const WELCOME: &str = "\
Welcome to homehub!

Every table in homehub.toml other than [homehub] and [logging] sets up
one component. Remove [introduction] to hide this message.";

/// `[introduction]` takes no keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntroductionConfig {}

impl Section for IntroductionConfig {}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component() -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .config_schema(typed::<IntroductionConfig>)
        .setup(|_ctx, _config| {
            tracing::info!("{WELCOME}");
            Ok::<_, BoxError>(true)
        })
        .build()
}
