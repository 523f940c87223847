//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `homehub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.
//!
//! `[homehub]` and `[logging]` are reserved; every other top-level key
//! configures the component it names (`[light]`, `["light 2"]`,
//! `[[light]]`, ...). The shape of a component section is checked by that
//! component at setup, so a malformed one only fails its own domain.

use std::path::PathBuf;

use homehub_domain::config::{CORE_DOMAIN, Configuration, domain_key};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Core settings.
    pub homehub: CoreConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Component sections, keyed by `domain` or `domain <label>`.
    #[serde(flatten)]
    pub components: toml::Table,
}

/// `[homehub]` core section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding state; requirements install into `<config_dir>/deps`.
    pub config_dir: PathBuf,
    /// Bypass requirement installation entirely.
    pub skip_pip: bool,
    /// Interpreter used to run pip.
    pub python: PathBuf,
    /// Optional pip constraints file.
    pub constraints: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homehub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HOMEHUB_CONFIG_DIR") {
            self.homehub.config_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("HOMEHUB_SKIP_PIP") {
            self.homehub.skip_pip = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("HOMEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.homehub.python.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "homehub.python must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory requirements are installed into.
    #[must_use]
    pub fn deps_dir(&self) -> PathBuf {
        self.homehub.config_dir.join("deps")
    }

    /// Component sections as the bootstrap's configuration, core section
    /// included. Keys that are not a valid domain key are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Convert`] if a section cannot be represented
    /// as JSON.
    pub fn components(&self) -> Result<Configuration, ConfigError> {
        let mut config = Configuration::new();
        config.insert(
            CORE_DOMAIN.to_string(),
            serde_json::to_value(&self.homehub)?,
        );
        for (key, value) in &self.components {
            if let Err(err) = domain_key(key) {
                tracing::warn!(%key, error = %err, "ignoring component section");
                continue;
            }
            config.insert(key.clone(), serde_json::to_value(value)?);
        }
        Ok(config)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            skip_pip: false,
            python: PathBuf::from("python3"),
            constraints: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homehubd=info,homehub_app=info,homehub_adapter_builtin=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A section could not be converted for the bootstrap.
    #[error("failed to convert component section")]
    Convert(#[from] serde_json::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
