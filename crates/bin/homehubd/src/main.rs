//! # homehubd: homehub daemon
//!
//! Composition root that wires the component bootstrap together and runs it.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Register the built-in components
//! - Construct the setup context, injecting the pip installer, the
//!   notification reporter and the event bus via port traits
//! - Run the staged bootstrap over every configured component
//! - Handle shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no bootstrap logic belongs here.

mod config;

use std::sync::Arc;

use homehub_adapter_builtin::{BuiltinServices, EventHistory, LogFilter};
use homehub_adapter_pip::PipInstaller;
use homehub_app::component::BoxError;
use homehub_app::context::SetupContext;
use homehub_app::event_bus::InProcessEventBus;
use homehub_app::notifier::NotificationReporter;
use homehub_domain::event::{Event, EventType};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Lets the `logger` component swap the subscriber's filter at runtime.
struct ReloadFilter(reload::Handle<EnvFilter, Registry>);

impl LogFilter for ReloadFilter {
    fn apply(&self, directives: &str) -> Result<(), BoxError> {
        self.0.reload(EnvFilter::try_new(directives)?)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    let (filter, filter_handle) = reload::Layer::new(EnvFilter::try_new(&config.logging.filter)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Components
    let services = BuiltinServices {
        log_filter: Arc::new(ReloadFilter(filter_handle)),
        history: EventHistory::default(),
    };
    let registry = homehub_adapter_builtin::registry(&services)?;

    // Ports
    let mut installer = PipInstaller::new(&config.homehub.python);
    if let Some(constraints) = &config.homehub.constraints {
        installer = installer.with_constraints(constraints);
    }
    let reporter = Arc::new(NotificationReporter::default());
    let event_bus = InProcessEventBus::new(256);

    let ctx = SetupContext::builder()
        .loader(Arc::new(registry))
        .installer(Arc::new(installer))
        .reporter(reporter.clone())
        .event_bus(Arc::new(event_bus))
        .skip_pip(config.homehub.skip_pip)
        .deps_dir(config.deps_dir())
        .build()?;

    // Bootstrap
    let report = ctx.async_setup_components(config.components()?).await;
    if let Some(message) = reporter.message() {
        tracing::warn!("{message}");
    }
    tracing::info!(loaded = ?report.loaded, "homehub started");
    ctx.event_bus()
        .fire(Event::new(EventType::HomehubStart, serde_json::json!({})));

    tokio::signal::ctrl_c().await?;

    tracing::info!(recorded = services.history.len(), "shutting down");
    ctx.event_bus()
        .fire(Event::new(EventType::HomehubStop, serde_json::json!({})));
    Ok(())
}
