//! Common error types used across the workspace.
//!
//! A failed component setup never aborts its siblings: the orchestrator
//! turns every failure into a [`SetupError`], reports it and records it in
//! the setup cache. Each layer above defines its own typed errors and
//! converts via `#[from]`.

/// Whether a failed setup may be attempted again in the same process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// The failure depends on the environment and may go away.
    Retryable,
    /// The component broke its contract and stays disabled.
    Poison,
}

/// Why a component could not be set up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// No component is registered under the domain.
    #[error("component not found")]
    NotFound,

    /// The dependency closure is missing a domain or contains a cycle.
    #[error("unable to resolve component dependencies")]
    UnresolvedDependencies,

    /// The configuration slice for the domain failed validation.
    #[error("invalid config")]
    InvalidConfig(#[source] ConfigError),

    /// A declared requirement could not be installed.
    #[error("could not install requirement {requirement}")]
    Requirement {
        /// The package specifier that failed.
        requirement: String,
    },

    /// At least one declared dependency is on the forbidden list.
    #[error("found blacklisted dependencies: {}", .dependencies.join(", "))]
    BlacklistedDependency {
        /// The offending dependency names.
        dependencies: Vec<String>,
    },

    /// At least one dependency failed to set up.
    #[error("could not set up dependencies: {}", .dependencies.join(", "))]
    Dependency {
        /// The dependencies whose setup returned a failure.
        dependencies: Vec<String>,
    },

    /// The entry point returned `false`.
    #[error("component failed to initialize")]
    Declined,

    /// The entry point returned something other than a boolean.
    #[error("component did not return boolean if setup was successful (got {returned}), disabling component")]
    NonBoolean {
        /// Rendering of the value that was returned.
        returned: String,
    },

    /// The entry point raised an error or panicked.
    #[error("error during setup: {message}")]
    Execution {
        /// Rendering of the error or panic payload.
        message: String,
    },
}

impl SetupError {
    /// Retry policy attached to this kind of failure.
    ///
    /// Only a broken return contract poisons the component; every other
    /// failure leaves the domain eligible for a later attempt.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::NonBoolean { .. } => RetryPolicy::Poison,
            _ => RetryPolicy::Retryable,
        }
    }

    /// Whether a setup notification should link to the component docs.
    ///
    /// An unknown domain has no documentation page to point at.
    #[must_use]
    pub fn show_link(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

impl From<ConfigError> for SetupError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

/// Configuration-level errors (keys and component slices).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A top-level key is not `domain` or `domain <label>`.
    #[error("invalid domain key {key:?}")]
    InvalidDomainKey {
        /// The offending key.
        key: String,
    },

    /// A component section has the wrong shape.
    #[error("expected {expected} for {domain}, found {found}")]
    UnexpectedType {
        /// Domain whose section is malformed.
        domain: String,
        /// Shape the component expects.
        expected: &'static str,
        /// Shape that was found.
        found: &'static str,
    },

    /// A component schema rejected its section.
    #[error("invalid value for {domain}.{key}: {reason}")]
    Schema {
        /// Domain whose section was rejected.
        domain: String,
        /// Offending key inside the section.
        key: String,
        /// Human readable reason.
        reason: String,
    },

    /// A section could not be read into the component's typed config.
    #[error("invalid config for {domain}: {reason}")]
    Section {
        /// Domain whose section was rejected.
        domain: String,
        /// Human readable reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_poison_only_on_broken_return_contract() {
        let poisoned = SetupError::NonBoolean {
            returned: "null".to_string(),
        };
        assert_eq!(poisoned.retry_policy(), RetryPolicy::Poison);

        for err in [
            SetupError::NotFound,
            SetupError::UnresolvedDependencies,
            SetupError::Declined,
            SetupError::Requirement {
                requirement: "pkg==1.0".to_string(),
            },
            SetupError::Execution {
                message: "boom".to_string(),
            },
        ] {
            assert_eq!(err.retry_policy(), RetryPolicy::Retryable);
        }
    }

    #[test]
    fn should_hide_link_when_component_not_found() {
        assert!(!SetupError::NotFound.show_link());
        assert!(SetupError::Declined.show_link());
    }

    #[test]
    fn should_list_blacklisted_dependencies_in_message() {
        let err = SetupError::BlacklistedDependency {
            dependencies: vec!["config".to_string(), "other".to_string()],
        };
        assert_eq!(err.to_string(), "found blacklisted dependencies: config, other");
    }

    #[test]
    fn should_convert_config_error_into_invalid_config() {
        let err: SetupError = ConfigError::InvalidDomainKey {
            key: "light ".to_string(),
        }
        .into();
        assert!(matches!(err, SetupError::InvalidConfig(_)));
    }

    #[test]
    fn should_display_schema_error() {
        let err = ConfigError::Schema {
            domain: "mqtt".to_string(),
            key: "port".to_string(),
            reason: "must be a positive integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for mqtt.port: must be a positive integer"
        );
    }
}
