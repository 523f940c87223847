//! Configuration: the merged mapping handed to component setup.
//!
//! The top level maps a *config key* to an arbitrary nested value. A key is
//! either a bare domain (`light`) or a domain followed by a label
//! (`light 2`), which lets the same component be configured in several
//! sections.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::ConfigError;

/// Merged configuration, keyed by config key.
pub type Configuration = serde_json::Map<String, Value>;

/// Reserved key holding the hub's own settings. Never set up as a component.
pub const CORE_DOMAIN: &str = "homehub";

/// Return the domain a top-level config key belongs to.
///
/// A domain is separated from its label by one or more spaces; empty labels
/// are not allowed.
///
/// | key | result |
/// |-----|--------|
/// | `hue` | `hue` |
/// | `hue 1` | `hue` |
/// | `hue  1` | `hue` |
/// | `hue ` | error |
/// | ` hue` | error |
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDomainKey`] when the key is malformed.
pub fn domain_key(key: &str) -> Result<&str, ConfigError> {
    let domain = match key.split_once(' ') {
        Some((head, label)) if !label.trim_matches(' ').is_empty() => head,
        _ => key,
    };
    if domain.is_empty() || domain.trim_matches(' ') != domain {
        return Err(ConfigError::InvalidDomainKey {
            key: key.to_string(),
        });
    }
    Ok(domain)
}

/// Return every key of `config` that belongs to `domain`, in key order.
///
/// Malformed keys are skipped.
#[must_use]
pub fn extract_domain_configs<'a>(config: &'a Configuration, domain: &str) -> Vec<&'a str> {
    config
        .keys()
        .filter(|key| domain_key(key).is_ok_and(|d| d == domain))
        .map(String::as_str)
        .collect()
}

/// Return the set of component domains declared in `config`.
///
/// The reserved [`CORE_DOMAIN`] section and malformed keys are left out.
#[must_use]
pub fn configured_domains(config: &Configuration) -> BTreeSet<String> {
    config
        .keys()
        .filter_map(|key| domain_key(key).ok())
        .filter(|domain| *domain != CORE_DOMAIN)
        .map(ToString::to_string)
        .collect()
}

/// Short name of a JSON value's shape, for error messages.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Configuration {
        match value {
            Value::Object(map) => map,
            _ => panic!("test config must be an object"),
        }
    }

    #[test]
    fn should_return_bare_domain() {
        assert_eq!(domain_key("hue").unwrap(), "hue");
    }

    #[test]
    fn should_strip_label_from_domain() {
        assert_eq!(domain_key("hue 1").unwrap(), "hue");
        assert_eq!(domain_key("hue  1").unwrap(), "hue");
        assert_eq!(domain_key("light living room").unwrap(), "light");
    }

    #[test]
    fn should_reject_empty_label() {
        assert!(domain_key("hue ").is_err());
        assert!(domain_key("hue  ").is_err());
    }

    #[test]
    fn should_reject_leading_space_and_empty_key() {
        assert!(domain_key(" hue").is_err());
        assert!(domain_key("").is_err());
    }

    #[test]
    fn should_extract_all_sections_for_domain() {
        let cfg = config(json!({
            "light": {"platform": "hue"},
            "light 2": {"platform": "demo"},
            "lightning": {},
            "switch": {},
        }));
        let mut keys = extract_domain_configs(&cfg, "light");
        keys.sort_unstable();
        assert_eq!(keys, vec!["light", "light 2"]);
    }

    #[test]
    fn should_list_configured_domains_without_core_section() {
        let cfg = config(json!({
            "homehub": {"skip_pip": true},
            "light": {},
            "light 2": {},
            "mqtt": {},
            "bad ": {},
        }));
        let domains: Vec<_> = configured_domains(&cfg).into_iter().collect();
        assert_eq!(domains, vec!["light".to_string(), "mqtt".to_string()]);
    }

    #[test]
    fn should_name_value_kinds() {
        assert_eq!(value_kind(&json!({})), "mapping");
        assert_eq!(value_kind(&json!([])), "list");
        assert_eq!(value_kind(&Value::Null), "null");
    }
}
