//! Stage scheduler: brings every configured domain online in two stages.
//!
//! Stage 1 is the fixed allowlist of foundational domains
//! ([`STAGE_1_DOMAINS`](homehub_domain::stage::STAGE_1_DOMAINS)); stage 2
//! is everything else. Each stage fans out concurrently and the scheduler
//! waits for the whole batch to settle, successes and failures alike,
//! before moving on. Ordering inside a stage comes only from each
//! component's own dependencies.

use std::collections::BTreeSet;
use std::time::Duration;

use futures::future::join_all;
use homehub_domain::config::{Configuration, configured_domains};
use homehub_domain::stage::{Stage, partition};
use homehub_domain::time::format_duration;
use tokio::task::JoinHandle;

use crate::context::SetupContext;

/// How often in-flight setups are checked.
const SLOW_STARTUP_CHECK_INTERVAL: Duration = Duration::from_secs(1);
/// Every this many checks, in-flight setups are logged as a warning.
const LOG_SLOW_STARTUP_INTERVAL: u32 = 60;

/// Outcome of a full bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Every loaded domain, dependencies included.
    pub loaded: BTreeSet<String>,
    /// Configured domains that did not load.
    pub failed: BTreeSet<String>,
}

impl SetupContext {
    /// Set up every domain present in `config`, stage 1 first.
    ///
    /// The configuration is stored on the context before anything fans
    /// out. Individual failures never stop the bootstrap.
    #[tracing::instrument(skip_all)]
    pub async fn async_setup_components(&self, config: Configuration) -> BootstrapReport {
        self.set_configuration(config.clone());
        let domains = configured_domains(&config);
        let (stage_1, stage_2) = partition(domains.iter().cloned());

        let watcher = PendingSetupWatcher::spawn(self);

        if !stage_1.is_empty() {
            tracing::info!(
                domains = ?stage_1,
                dependencies = ?self.stage_1_dependencies(&stage_1),
                "setting up {}",
                Stage::One
            );
            self.setup_multi_components(&stage_1, &config).await;
        }

        tracing::info!(domains = ?stage_2, "setting up {}", Stage::Two);
        self.setup_multi_components(&stage_2, &config).await;

        drop(watcher);

        let mut timings: Vec<_> = self.setup_timings().into_iter().collect();
        timings.sort_by(|a, b| b.1.cmp(&a.1));
        let timings: Vec<String> = timings
            .into_iter()
            .map(|(domain, elapsed)| format!("{domain}: {}", format_duration(elapsed)))
            .collect();
        tracing::debug!(?timings, "integration setup times");

        let loaded = self.loaded_components();
        let failed: BTreeSet<String> = domains
            .into_iter()
            .filter(|domain| !loaded.contains(domain))
            .collect();
        if failed.is_empty() {
            tracing::info!(loaded = loaded.len(), "bootstrap complete");
        } else {
            tracing::warn!(?failed, loaded = loaded.len(), "bootstrap complete with failures");
        }
        BootstrapReport { loaded, failed }
    }

    /// Set up `domains` concurrently and wait for all of them.
    ///
    /// Domains already loaded are not scheduled again.
    pub async fn setup_multi_components(&self, domains: &BTreeSet<String>, config: &Configuration) {
        let to_load: Vec<&String> = domains
            .iter()
            .filter(|domain| !self.is_loaded(domain))
            .collect();
        join_all(
            to_load
                .into_iter()
                .map(|domain| self.async_setup_component(domain, Some(config.clone()))),
        )
        .await;
    }

    /// Declared dependencies of stage-1 domains that are not stage 1 themselves.
    ///
    /// They get set up during stage 1 by dependency recursion.
    fn stage_1_dependencies(&self, stage_1: &BTreeSet<String>) -> BTreeSet<String> {
        stage_1
            .iter()
            .filter_map(|domain| self.inner.loader.get_component(domain))
            .flat_map(|component| component.dependencies().as_slice().to_vec())
            .filter(|dep| !stage_1.contains(dep))
            .collect()
    }
}

/// Periodically logs setups that are still in flight. Stops when dropped.
struct PendingSetupWatcher {
    handle: JoinHandle<()>,
}

impl PendingSetupWatcher {
    fn spawn(ctx: &SetupContext) -> Self {
        let ctx = ctx.clone();
        let handle = ctx.inner.runtime.clone().spawn(async move {
            let mut interval = tokio::time::interval(SLOW_STARTUP_CHECK_INTERVAL);
            interval.tick().await;
            let mut ticks: u32 = 0;
            loop {
                interval.tick().await;
                ticks = ticks.wrapping_add(1);
                let pending = ctx.pending_setups();
                if pending.is_empty() {
                    continue;
                }
                let waiting: Vec<String> = pending
                    .iter()
                    .map(|(domain, elapsed)| format!("{domain} ({})", format_duration(*elapsed)))
                    .collect();
                if ticks % LOG_SLOW_STARTUP_INTERVAL == 0 {
                    tracing::warn!(?waiting, "waiting on integrations to complete setup");
                } else {
                    tracing::debug!(?waiting, "waiting on integrations to complete setup");
                }
            }
        });
        Self { handle }
    }
}

impl Drop for PendingSetupWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
