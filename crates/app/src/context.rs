//! Setup context: process-wide state shared by every setup operation.
//!
//! The context owns the setup-task cache, the set of loaded domains, the
//! package-install lock and the merged configuration, plus the ports the
//! orchestrator talks to. It is created once at startup and cloned freely:
//! every clone points at the same state.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use homehub_domain::config::Configuration;
use homehub_domain::error::RetryPolicy;
use tokio::runtime::Handle;

use crate::event_bus::InProcessEventBus;
use crate::notifier::NotificationReporter;
use crate::ports::{
    ComponentLoader, ConfigValidator, DependencyResolver, ErrorReporter, EventBus,
    PackageInstaller,
};
use crate::resolver::GraphResolver;
use crate::task::{SetupTask, TaskState};
use crate::validation::SliceValidator;

/// Default capacity of the event bus created when none is supplied.
const DEFAULT_BUS_CAPACITY: usize = 256;

/// Shared, cheaply cloneable handle on the bootstrap state.
#[derive(Clone)]
pub struct SetupContext {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) loader: Arc<dyn ComponentLoader>,
    pub(crate) resolver: Arc<dyn DependencyResolver>,
    pub(crate) validator: Arc<dyn ConfigValidator>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) installer: Option<Arc<dyn PackageInstaller>>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) skip_pip: bool,
    pub(crate) deps_dir: PathBuf,
    pub(crate) runtime: Handle,
    /// Domain → setup task. One entry per domain for the process lifetime.
    pub(crate) setup_tasks: Mutex<HashMap<String, SetupTask>>,
    pub(crate) loaded: Mutex<BTreeSet<String>>,
    /// Domains disabled after breaking the return contract.
    pub(crate) unavailable: Mutex<HashSet<String>>,
    /// Serializes every call into the package installer.
    pub(crate) install_lock: tokio::sync::Mutex<()>,
    /// Requirements already installed by this process.
    pub(crate) installed: Mutex<HashSet<String>>,
    pub(crate) setup_started: Mutex<HashMap<String, Instant>>,
    pub(crate) timings: Mutex<HashMap<String, Duration>>,
    pub(crate) configuration: RwLock<Configuration>,
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SetupContext {
    /// Create a builder. A [`ComponentLoader`] is the only mandatory port.
    #[must_use]
    pub fn builder() -> SetupContextBuilder {
        SetupContextBuilder::default()
    }

    /// Whether requirement installation is bypassed.
    #[must_use]
    pub fn skip_pip(&self) -> bool {
        self.inner.skip_pip
    }

    /// Directory requirements are installed into.
    #[must_use]
    pub fn deps_dir(&self) -> &Path {
        &self.inner.deps_dir
    }

    /// Event bus shared with components.
    #[must_use]
    pub fn event_bus(&self) -> &dyn EventBus {
        self.inner.bus.as_ref()
    }

    /// Snapshot of the merged configuration.
    #[must_use]
    pub fn configuration(&self) -> Configuration {
        self.inner
            .configuration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the merged configuration.
    ///
    /// Called once by the bootstrap before any setup fans out.
    pub fn set_configuration(&self, config: Configuration) {
        *self
            .inner
            .configuration
            .write()
            .unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Domains whose setup succeeded, sorted.
    #[must_use]
    pub fn loaded_components(&self) -> BTreeSet<String> {
        lock(&self.inner.loaded).clone()
    }

    #[must_use]
    pub fn is_loaded(&self, domain: &str) -> bool {
        lock(&self.inner.loaded).contains(domain)
    }

    /// Whether `domain` was disabled by a broken return contract.
    #[must_use]
    pub fn is_unavailable(&self, domain: &str) -> bool {
        lock(&self.inner.unavailable).contains(domain)
    }

    /// The cached setup task for `domain`, if one was ever created.
    #[must_use]
    pub fn setup_task(&self, domain: &str) -> Option<SetupTask> {
        lock(&self.inner.setup_tasks).get(domain).cloned()
    }

    /// Current state of every cached setup task.
    #[must_use]
    pub fn setup_states(&self) -> BTreeMap<String, TaskState> {
        lock(&self.inner.setup_tasks)
            .iter()
            .map(|(domain, task)| (domain.clone(), task.state()))
            .collect()
    }

    /// Domains whose setup is in flight, with how long they have been running.
    #[must_use]
    pub fn pending_setups(&self) -> BTreeMap<String, Duration> {
        lock(&self.inner.setup_started)
            .iter()
            .map(|(domain, started)| (domain.clone(), started.elapsed()))
            .collect()
    }

    /// Time each settled domain spent in setup.
    #[must_use]
    pub fn setup_timings(&self) -> HashMap<String, Duration> {
        lock(&self.inner.timings).clone()
    }

    /// Forget a failed setup so the next request runs it again.
    ///
    /// Only failures with a [`RetryPolicy::Retryable`] policy are forgotten;
    /// successful, in-flight and poisoned setups stay cached. Returns `true`
    /// when the task was dropped from the cache.
    pub fn reset_failed(&self, domain: &str) -> bool {
        if self.is_unavailable(domain) {
            return false;
        }
        let mut tasks = lock(&self.inner.setup_tasks);
        let retryable = tasks.get(domain).is_some_and(|task| {
            matches!(task.state(), TaskState::Failed(err) if err.retry_policy() == RetryPolicy::Retryable)
        });
        if retryable {
            tasks.remove(domain);
            tracing::debug!(domain, "forgot failed setup");
        }
        retryable
    }

    pub(crate) fn mark_started(&self, domain: &str) {
        lock(&self.inner.setup_started).insert(domain.to_string(), Instant::now());
    }

    pub(crate) fn mark_settled(&self, domain: &str, elapsed: Duration) {
        lock(&self.inner.setup_started).remove(domain);
        lock(&self.inner.timings).insert(domain.to_string(), elapsed);
    }

    pub(crate) fn mark_loaded(&self, domain: &str) {
        lock(&self.inner.loaded).insert(domain.to_string());
    }

    pub(crate) fn mark_unavailable(&self, domain: &str) {
        lock(&self.inner.unavailable).insert(domain.to_string());
    }
}

/// Builder for [`SetupContext`].
#[derive(Default)]
pub struct SetupContextBuilder {
    loader: Option<Arc<dyn ComponentLoader>>,
    resolver: Option<Arc<dyn DependencyResolver>>,
    validator: Option<Arc<dyn ConfigValidator>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    installer: Option<Arc<dyn PackageInstaller>>,
    bus: Option<Arc<dyn EventBus>>,
    skip_pip: bool,
    deps_dir: Option<PathBuf>,
    configuration: Configuration,
}

impl SetupContextBuilder {
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn ComponentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Defaults to [`GraphResolver`].
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Defaults to [`SliceValidator`].
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn ConfigValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Defaults to a fresh [`NotificationReporter`].
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Without an installer, components with requirements fail unless
    /// installation is skipped.
    #[must_use]
    pub fn installer(mut self, installer: Arc<dyn PackageInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Defaults to a fresh [`InProcessEventBus`].
    #[must_use]
    pub fn event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    #[must_use]
    pub fn skip_pip(mut self, skip_pip: bool) -> Self {
        self.skip_pip = skip_pip;
        self
    }

    /// Defaults to `deps` in the working directory.
    #[must_use]
    pub fn deps_dir(mut self, deps_dir: impl Into<PathBuf>) -> Self {
        self.deps_dir = Some(deps_dir.into());
        self
    }

    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Build the context, capturing the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingLoader`] when no loader was given and
    /// [`ContextError::NoRuntime`] when called outside a tokio runtime.
    pub fn build(self) -> Result<SetupContext, ContextError> {
        let loader = self.loader.ok_or(ContextError::MissingLoader)?;
        let runtime = Handle::try_current()?;
        let inner = Inner {
            loader,
            resolver: self
                .resolver
                .unwrap_or_else(|| Arc::new(GraphResolver)),
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(SliceValidator)),
            reporter: self
                .reporter
                .unwrap_or_else(|| Arc::new(NotificationReporter::default())),
            installer: self.installer,
            bus: self
                .bus
                .unwrap_or_else(|| Arc::new(InProcessEventBus::new(DEFAULT_BUS_CAPACITY))),
            skip_pip: self.skip_pip,
            deps_dir: self.deps_dir.unwrap_or_else(|| PathBuf::from("deps")),
            runtime,
            setup_tasks: Mutex::default(),
            loaded: Mutex::default(),
            unavailable: Mutex::default(),
            install_lock: tokio::sync::Mutex::new(()),
            installed: Mutex::default(),
            setup_started: Mutex::default(),
            timings: Mutex::default(),
            configuration: RwLock::new(self.configuration),
        };
        Ok(SetupContext {
            inner: Arc::new(inner),
        })
    }
}

/// Errors raised while building a [`SetupContext`].
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("a component loader is required")]
    MissingLoader,

    #[error("the setup context must be built inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistry;
    use homehub_domain::error::SetupError;

    fn context() -> SetupContext {
        SetupContext::builder()
            .loader(Arc::new(ComponentRegistry::default()))
            .build()
            .unwrap()
    }

    fn insert_settled(ctx: &SetupContext, domain: &str, outcome: Result<(), SetupError>) {
        let (task, progress) = SetupTask::new(domain);
        progress.finish(outcome);
        lock(&ctx.inner.setup_tasks).insert(domain.to_string(), task);
    }

    #[test]
    fn should_require_runtime() {
        let result = SetupContext::builder()
            .loader(Arc::new(ComponentRegistry::default()))
            .build();
        assert!(matches!(result, Err(ContextError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn should_require_loader() {
        let result = SetupContext::builder().build();
        assert!(matches!(result, Err(ContextError::MissingLoader)));
    }

    #[tokio::test]
    async fn should_use_defaults() {
        let ctx = context();
        assert!(!ctx.skip_pip());
        assert_eq!(ctx.deps_dir(), Path::new("deps"));
        assert!(ctx.loaded_components().is_empty());
        assert!(ctx.configuration().is_empty());
    }

    #[tokio::test]
    async fn should_share_state_between_clones() {
        let ctx = context();
        let other = ctx.clone();
        ctx.mark_loaded("light");
        assert!(other.is_loaded("light"));
    }

    #[tokio::test]
    async fn should_forget_retryable_failure() {
        let ctx = context();
        insert_settled(&ctx, "light", Err(SetupError::Declined));
        assert!(ctx.reset_failed("light"));
        assert!(ctx.setup_task("light").is_none());
    }

    #[tokio::test]
    async fn should_keep_poisoned_and_successful_setups() {
        let ctx = context();
        insert_settled(
            &ctx,
            "broken",
            Err(SetupError::NonBoolean {
                returned: "null".to_string(),
            }),
        );
        ctx.mark_unavailable("broken");
        insert_settled(&ctx, "light", Ok(()));

        assert!(!ctx.reset_failed("broken"));
        assert!(!ctx.reset_failed("light"));
        assert!(!ctx.reset_failed("unknown"));
        assert!(ctx.setup_task("broken").is_some());
        assert!(ctx.setup_task("light").is_some());
    }

    #[tokio::test]
    async fn should_record_timings_and_pending_setups() {
        let ctx = context();
        ctx.mark_started("light");
        assert!(ctx.pending_setups().contains_key("light"));

        ctx.mark_settled("light", Duration::from_millis(5));
        assert!(ctx.pending_setups().is_empty());
        assert_eq!(
            ctx.setup_timings().get("light"),
            Some(&Duration::from_millis(5))
        );
    }

    #[tokio::test]
    async fn should_replace_configuration() {
        let ctx = context();
        let mut config = Configuration::new();
        config.insert("light".to_string(), serde_json::json!({}));
        ctx.set_configuration(config.clone());
        assert_eq!(ctx.configuration(), config);
    }
}
