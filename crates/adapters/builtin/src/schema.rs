//! Typed config sections.
//!
//! Built-in components describe their section as a serde struct; the schema
//! hook reads the slice into it (filling defaults), runs its checks and
//! hands back the normalized value, so entry points always see a complete
//! section.

use homehub_app::validation::expect_mapping;
use homehub_domain::error::ConfigError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A component's typed config section.
pub(crate) trait Section: DeserializeOwned + Serialize {
    /// Checks serde cannot express.
    fn validate(&self, _domain: &str) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Read `value` into `T`, validate it and return its normalized form.
pub(crate) fn typed<T: Section>(domain: &str, value: Value) -> Result<Value, ConfigError> {
    let section = expect_mapping(domain, value)?;
    let parsed: T = serde_json::from_value(Value::Object(section)).map_err(|err| {
        ConfigError::Section {
            domain: domain.to_string(),
            reason: err.to_string(),
        }
    })?;
    parsed.validate(domain)?;
    serde_json::to_value(parsed).map_err(|err| ConfigError::Section {
        domain: domain.to_string(),
        reason: err.to_string(),
    })
}

/// Error for a key whose value is out of range.
pub(crate) fn invalid(domain: &str, key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Schema {
        domain: domain.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        name: String,
        #[serde(default = "default_size")]
        size: u8,
    }

    fn default_size() -> u8 {
        3
    }

    impl Section for Sample {
        fn validate(&self, domain: &str) -> Result<(), ConfigError> {
            if self.size == 0 {
                return Err(invalid(domain, "size", "must be positive"));
            }
            Ok(())
        }
    }

    #[test]
    fn should_fill_defaults() {
        let value = typed::<Sample>("sample", json!({"name": "x"})).unwrap();
        assert_eq!(value, json!({"name": "x", "size": 3}));
    }

    #[test]
    fn should_reject_unknown_field() {
        let err = typed::<Sample>("sample", json!({"name": "x", "colour": "red"})).unwrap_err();
        assert!(matches!(err, ConfigError::Section { ref domain, .. } if domain == "sample"));
    }

    #[test]
    fn should_run_section_checks() {
        let err = typed::<Sample>("sample", json!({"name": "x", "size": 0})).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for sample.size: must be positive");
    }

    #[test]
    fn should_reject_non_mapping() {
        let err = typed::<Sample>("sample", json!([1, 2])).unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedType { found: "list", .. }));
    }
}
