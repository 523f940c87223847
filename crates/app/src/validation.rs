//! Slice validator: the default [`ConfigValidator`].
//!
//! Extracts the section(s) belonging to a component and hands them to the
//! component's own schema, if it declares one.
//!
//! | sections for the domain | slice |
//! |-------------------------|-------|
//! | none | `{}` |
//! | one (`light`) | its value, `null` read as `{}` |
//! | several (`light`, `light 2`) | a list of every value, nested lists flattened |

use homehub_domain::config::{Configuration, extract_domain_configs, value_kind};
use homehub_domain::error::ConfigError;
use serde_json::{Map, Value};

use crate::component::ComponentDescriptor;
use crate::ports::ConfigValidator;

/// Extracts a component's slice and applies its schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceValidator;

impl ConfigValidator for SliceValidator {
    fn process_component_config(
        &self,
        component: &ComponentDescriptor,
        config: &Configuration,
    ) -> Result<Value, ConfigError> {
        let domain = component.domain();
        let sections: Vec<&Value> = extract_domain_configs(config, domain)
            .into_iter()
            .filter_map(|key| config.get(key))
            .collect();

        let slice = match sections.as_slice() {
            [] | [Value::Null] => Value::Object(Map::new()),
            [single] => (*single).clone(),
            many => {
                let mut items = Vec::new();
                for section in many {
                    match section {
                        Value::Null => {}
                        Value::Array(nested) => items.extend(nested.iter().cloned()),
                        other => items.push((*other).clone()),
                    }
                }
                Value::Array(items)
            }
        };

        match component.config_schema() {
            Some(schema) => schema(domain, slice),
            None => Ok(slice),
        }
    }
}

/// Require `value` to be a mapping and return it.
///
/// # Errors
///
/// Returns [`ConfigError::UnexpectedType`] for any other shape.
pub fn expect_mapping(domain: &str, value: Value) -> Result<Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::UnexpectedType {
            domain: domain.to_string(),
            expected: "mapping",
            found: value_kind(&other),
        }),
    }
}
