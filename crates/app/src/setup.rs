//! Setup orchestrator and per-component processor.
//!
//! [`SetupContext::async_setup_component`] is the single entry into
//! component setup. The first request for a domain creates a [`SetupTask`],
//! caches it and spawns the processor; every later request, concurrent or
//! not, waits on that same task.
//!
//! The processor runs in its own spawned task so a panic anywhere in a
//! component's code settles the domain as failed instead of unwinding into
//! the caller.

use std::time::Instant;

use futures::future::join_all;
use homehub_domain::config::Configuration;
use homehub_domain::dependency::blacklisted;
use homehub_domain::error::{RetryPolicy, SetupError};
use homehub_domain::event::Event;
use homehub_domain::time::format_duration;
use serde_json::Value;
use tokio::task::JoinError;

use crate::component::{ComponentDescriptor, SetupEntry, SetupReturn};
use crate::context::{SetupContext, lock};
use crate::task::{SetupTask, TaskProgress};

impl SetupContext {
    /// Set up `domain` and its dependencies, at most once per process.
    ///
    /// `config` is the full configuration the component slice is taken
    /// from; `None` means an empty configuration. Only the first request
    /// for a domain decides which configuration is used.
    ///
    /// # Errors
    ///
    /// Returns the [`SetupError`] the domain's setup task settled with.
    pub async fn try_setup_component(
        &self,
        domain: &str,
        config: Option<Configuration>,
    ) -> Result<(), SetupError> {
        self.setup_task_for(domain, config.unwrap_or_default())
            .wait()
            .await
    }

    /// Set up `domain`, returning `true` when it is loaded.
    ///
    /// Failures are logged and reported, never propagated.
    pub async fn async_setup_component(&self, domain: &str, config: Option<Configuration>) -> bool {
        self.try_setup_component(domain, config).await.is_ok()
    }

    /// Blocking form of [`async_setup_component`](Self::async_setup_component)
    /// for synchronous entry points running on the blocking pool.
    ///
    /// # Panics
    ///
    /// Panics when called from an asynchronous execution context, such as
    /// a runtime worker thread.
    pub fn setup_component(&self, domain: &str, config: Option<Configuration>) -> bool {
        self.inner
            .runtime
            .block_on(self.async_setup_component(domain, config))
    }

    /// Return the cached task for `domain`, creating and starting it first
    /// if needed.
    pub(crate) fn setup_task_for(&self, domain: &str, config: Configuration) -> SetupTask {
        let mut tasks = lock(&self.inner.setup_tasks);
        if let Some(task) = tasks.get(domain) {
            return task.clone();
        }
        let (task, progress) = SetupTask::new(domain);
        tasks.insert(domain.to_string(), task.clone());
        drop(tasks);

        let ctx = self.clone();
        let domain = domain.to_string();
        self.inner
            .runtime
            .spawn(async move { ctx.run_setup(domain, config, progress).await });
        task
    }

    async fn run_setup(self, domain: String, config: Configuration, progress: TaskProgress) {
        progress.running();
        self.mark_started(&domain);
        let started = Instant::now();

        let processor = {
            let ctx = self.clone();
            let domain = domain.clone();
            self.inner
                .runtime
                .spawn(async move { ctx.process_component(&domain, &config).await })
        };
        let outcome = processor.await.unwrap_or_else(|err| {
            Err(SetupError::Execution {
                message: join_error_message(err),
            })
        });

        let elapsed = started.elapsed();
        self.mark_settled(&domain, elapsed);
        match &outcome {
            Ok(()) => {
                self.mark_loaded(&domain);
                self.inner.bus.fire(Event::component_loaded(&domain));
                tracing::info!(%domain, elapsed = %format_duration(elapsed), "setup complete");
            }
            Err(err) => {
                tracing::error!(%domain, reason = %err, "setup failed");
                if err.retry_policy() == RetryPolicy::Poison {
                    self.mark_unavailable(&domain);
                }
                self.inner
                    .reporter
                    .notify_setup_error(&domain, err, err.show_link());
            }
        }
        progress.finish(outcome);
    }

    async fn process_component(
        &self,
        domain: &str,
        config: &Configuration,
    ) -> Result<(), SetupError> {
        let component = self
            .inner
            .loader
            .get_component(domain)
            .ok_or(SetupError::NotFound)?;

        let order = self
            .inner
            .resolver
            .load_order(self.inner.loader.as_ref(), domain);
        if order.is_empty() {
            return Err(SetupError::UnresolvedDependencies);
        }

        let slice = self
            .inner
            .validator
            .process_component_config(&component, config)?;

        self.process_requirements(domain, component.requirements())
            .await?;

        self.setup_dependencies(&component, config).await?;

        self.invoke_entry(&component, slice).await
    }

    /// Set up every declared dependency concurrently and join them.
    async fn setup_dependencies(
        &self,
        component: &ComponentDescriptor,
        config: &Configuration,
    ) -> Result<(), SetupError> {
        let dependencies = component.dependencies();
        if dependencies.is_empty() {
            return Ok(());
        }

        let forbidden = blacklisted(dependencies.as_slice());
        if !forbidden.is_empty() {
            return Err(SetupError::BlacklistedDependency {
                dependencies: forbidden,
            });
        }

        let tasks: Vec<SetupTask> = dependencies
            .iter()
            .map(|dep| self.setup_task_for(dep, config.clone()))
            .collect();
        let outcomes = join_all(tasks.iter().map(SetupTask::wait)).await;

        let failed: Vec<String> = tasks
            .iter()
            .zip(outcomes)
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(task, _)| task.domain().to_string())
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(SetupError::Dependency {
                dependencies: failed,
            })
        }
    }

    /// Run the entry point off the scheduler and check its return contract.
    async fn invoke_entry(
        &self,
        component: &ComponentDescriptor,
        slice: Value,
    ) -> Result<(), SetupError> {
        let ctx = self.clone();
        let returned = match component.entry().clone() {
            SetupEntry::Sync(entry) => {
                self.inner
                    .runtime
                    .spawn_blocking(move || entry(ctx, slice))
                    .await
            }
            SetupEntry::Async(entry) => self.inner.runtime.spawn(entry(ctx, slice)).await,
        };

        match returned {
            Ok(Ok(SetupReturn::Bool(true))) => Ok(()),
            Ok(Ok(SetupReturn::Bool(false))) => Err(SetupError::Declined),
            Ok(Ok(SetupReturn::Other(returned))) => Err(SetupError::NonBoolean { returned }),
            Ok(Err(err)) => Err(SetupError::Execution {
                message: err.to_string(),
            }),
            Err(err) => Err(SetupError::Execution {
                message: join_error_message(err),
            }),
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            format!("panicked: {message}")
        }
        Err(err) => err.to_string(),
    }
}
