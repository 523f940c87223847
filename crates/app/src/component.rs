//! Component descriptor: the fixed interface every pluggable unit exposes.
//!
//! The bootstrap knows exactly four things about a component: its domain,
//! its declared dependencies, its requirements and its setup entry point.
//! The entry point is either synchronous (run on the blocking pool) or
//! asynchronous (awaited on the runtime); the variant is explicit in
//! [`SetupEntry`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use homehub_domain::config::domain_key;
use homehub_domain::dependency::LoadOrder;
use homehub_domain::error::ConfigError;
use serde_json::Value;

use crate::context::SetupContext;

/// Error type an entry point may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What an entry point hands back to the orchestrator.
pub type EntryResult = Result<SetupReturn, BoxError>;

/// Synchronous entry point. Runs on the blocking pool.
pub type SyncSetupFn = dyn Fn(SetupContext, Value) -> EntryResult + Send + Sync;

/// Asynchronous entry point. Awaited on the runtime.
pub type AsyncSetupFn = dyn Fn(SetupContext, Value) -> BoxFuture<'static, EntryResult> + Send + Sync;

/// Optional per-component schema applied to the component's config slice.
pub type ConfigSchema = dyn Fn(&str, Value) -> Result<Value, ConfigError> + Send + Sync;

/// Value returned by a component entry point.
///
/// Only a boolean honours the contract; anything else disables the
/// component for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupReturn {
    Bool(bool),
    /// Anything that is not a boolean, rendered for the log.
    Other(String),
}

impl From<bool> for SetupReturn {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<()> for SetupReturn {
    fn from((): ()) -> Self {
        Self::Other("nothing".to_string())
    }
}

impl From<Option<bool>> for SetupReturn {
    fn from(value: Option<bool>) -> Self {
        value.map_or_else(|| Self::Other("null".to_string()), Self::Bool)
    }
}

impl From<Value> for SetupReturn {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(value) => Self::Bool(value),
            other => Self::Other(other.to_string()),
        }
    }
}

/// A component's setup entry point.
#[derive(Clone)]
pub enum SetupEntry {
    Sync(Arc<SyncSetupFn>),
    Async(Arc<AsyncSetupFn>),
}

impl fmt::Debug for SetupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("SetupEntry::Sync"),
            Self::Async(_) => f.write_str("SetupEntry::Async"),
        }
    }
}

/// One pluggable unit, as seen by the bootstrap.
pub struct ComponentDescriptor {
    domain: String,
    dependencies: LoadOrder,
    requirements: Vec<String>,
    entry: SetupEntry,
    config_schema: Option<Arc<ConfigSchema>>,
}

impl ComponentDescriptor {
    /// Create a builder for the component registered under `domain`.
    #[must_use]
    pub fn builder(domain: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder {
            domain: domain.into(),
            dependencies: LoadOrder::new(),
            requirements: Vec::new(),
            entry: None,
            config_schema: None,
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Declared direct dependencies, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &LoadOrder {
        &self.dependencies
    }

    /// Opaque package specifiers to install before setup.
    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    #[must_use]
    pub fn entry(&self) -> &SetupEntry {
        &self.entry
    }

    #[must_use]
    pub fn config_schema(&self) -> Option<&ConfigSchema> {
        self.config_schema.as_deref()
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("domain", &self.domain)
            .field("dependencies", &self.dependencies)
            .field("requirements", &self.requirements)
            .field("entry", &self.entry)
            .field("config_schema", &self.config_schema.is_some())
            .finish()
    }
}

/// Step-by-step builder for [`ComponentDescriptor`].
pub struct ComponentBuilder {
    domain: String,
    dependencies: LoadOrder,
    requirements: Vec<String>,
    entry: Option<SetupEntry>,
    config_schema: Option<Arc<ConfigSchema>>,
}

impl ComponentBuilder {
    #[must_use]
    pub fn dependency(mut self, domain: impl Into<String>) -> Self {
        self.dependencies.push(domain);
        self
    }

    #[must_use]
    pub fn dependencies<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for domain in domains {
            self.dependencies.push(domain);
        }
        self
    }

    #[must_use]
    pub fn requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    #[must_use]
    pub fn requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements
            .extend(requirements.into_iter().map(Into::into));
        self
    }

    /// Validate the component's config slice with `schema` before setup.
    ///
    /// The schema receives the domain and the extracted slice and returns
    /// the normalized slice.
    #[must_use]
    pub fn config_schema<F>(mut self, schema: F) -> Self
    where
        F: Fn(&str, Value) -> Result<Value, ConfigError> + Send + Sync + 'static,
    {
        self.config_schema = Some(Arc::new(schema));
        self
    }

    /// Use a synchronous entry point.
    #[must_use]
    pub fn setup<F, R>(mut self, entry: F) -> Self
    where
        F: Fn(SetupContext, Value) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<SetupReturn> + 'static,
    {
        self.entry = Some(SetupEntry::Sync(Arc::new(move |ctx, config| {
            entry(ctx, config).map(Into::<SetupReturn>::into)
        })));
        self
    }

    /// Use an asynchronous entry point.
    #[must_use]
    pub fn async_setup<F, Fut, R>(mut self, entry: F) -> Self
    where
        F: Fn(SetupContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
        R: Into<SetupReturn> + 'static,
    {
        self.entry = Some(SetupEntry::Async(Arc::new(move |ctx, config| {
            entry(ctx, config)
                .map(|res| res.map(Into::<SetupReturn>::into))
                .boxed()
        })));
        self
    }

    /// Consume the builder and return a [`ComponentDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the domain is not a plain domain
    /// name, the component depends on itself, or no entry point was given.
    pub fn build(self) -> Result<ComponentDescriptor, DescriptorError> {
        if domain_key(&self.domain).ok() != Some(self.domain.as_str()) {
            return Err(DescriptorError::InvalidDomain {
                domain: self.domain,
            });
        }
        if self.dependencies.contains(&self.domain) {
            return Err(DescriptorError::SelfDependency {
                domain: self.domain,
            });
        }
        let Some(entry) = self.entry else {
            return Err(DescriptorError::MissingEntryPoint {
                domain: self.domain,
            });
        };
        Ok(ComponentDescriptor {
            domain: self.domain,
            dependencies: self.dependencies,
            requirements: self.requirements,
            entry,
            config_schema: self.config_schema,
        })
    }
}

/// Errors raised while building a [`ComponentDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("invalid component domain {domain:?}")]
    InvalidDomain { domain: String },

    #[error("component {domain} depends on itself")]
    SelfDependency { domain: String },

    #[error("component {domain} has no setup entry point")]
    MissingEntryPoint { domain: String },
}
