//! Controller options. Each controller declares a schema of named options;
//! the game creation handler validates the caller-supplied map against it
//! before the controller is ever instantiated, so controllers read their
//! option values without further checking.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A declared option on a controller, sent to clients with the pack data.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionSpec {
    Int {
        default: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
    Bool {
        default: bool,
    },
    Select {
        default: String,
        choices: Vec<String>,
    },
}

/// A validated option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Bool(bool),
    Select(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OptionError {
    #[error("the \"{0}\" option was not supplied")]
    Missing(String),
    #[error("\"{0}\" is not an option of this controller")]
    Unknown(String),
    #[error("the \"{0}\" option has the wrong type")]
    WrongType(String),
    #[error("the \"{0}\" option is out of range")]
    OutOfRange(String),
    #[error("the \"{0}\" option is not one of its choices")]
    NotAChoice(String),
}

/// The validated option map handed to a controller factory.
#[derive(Clone, Debug, Default)]
pub struct OptionValues(HashMap<String, OptionValue>);

impl OptionValues {
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(OptionValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(OptionValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn select(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(OptionValue::Select(value)) => Some(value),
            _ => None,
        }
    }
}

/// Checks a caller-supplied option object against a declared schema: the
/// keys must match exactly and every value must fit its declared kind.
pub fn bind_options(
    schema: &[(&'static str, OptionSpec)],
    supplied: &serde_json::Map<String, Value>,
) -> Result<OptionValues, OptionError> {
    for key in supplied.keys() {
        if !schema.iter().any(|(name, _)| name == key) {
            return Err(OptionError::Unknown(key.clone()));
        }
    }

    let mut values = HashMap::new();
    for (name, spec) in schema {
        let value = supplied
            .get(*name)
            .ok_or_else(|| OptionError::Missing(name.to_string()))?;

        let bound = match spec {
            OptionSpec::Int { min, max, .. } => {
                let value = value
                    .as_i64()
                    .ok_or_else(|| OptionError::WrongType(name.to_string()))?;
                if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
                    return Err(OptionError::OutOfRange(name.to_string()));
                }
                OptionValue::Int(value)
            }
            OptionSpec::Bool { .. } => OptionValue::Bool(
                value
                    .as_bool()
                    .ok_or_else(|| OptionError::WrongType(name.to_string()))?,
            ),
            OptionSpec::Select { choices, .. } => {
                let value = value
                    .as_str()
                    .ok_or_else(|| OptionError::WrongType(name.to_string()))?;
                if !choices.iter().any(|choice| choice == value) {
                    return Err(OptionError::NotAChoice(name.to_string()));
                }
                OptionValue::Select(value.to_string())
            }
        };
        values.insert(name.to_string(), bound);
    }

    Ok(OptionValues(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<(&'static str, OptionSpec)> {
        vec![
            (
                "Game Start Timer",
                OptionSpec::Int {
                    default: 3,
                    min: Some(0),
                    max: None,
                },
            ),
            ("Force Capture", OptionSpec::Bool { default: true }),
        ]
    }

    fn object(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn binds_a_matching_map() {
        let supplied = object(json!({"Game Start Timer": 5, "Force Capture": false}));
        let values = bind_options(&schema(), &supplied).unwrap();
        assert_eq!(values.int("Game Start Timer"), Some(5));
        assert_eq!(values.bool("Force Capture"), Some(false));
    }

    #[test]
    fn rejects_missing_extra_and_mistyped_keys() {
        let supplied = object(json!({"Game Start Timer": 5}));
        assert!(matches!(
            bind_options(&schema(), &supplied),
            Err(OptionError::Missing(_))
        ));

        let supplied = object(json!({
            "Game Start Timer": 5,
            "Force Capture": true,
            "Extra": 1,
        }));
        assert!(matches!(
            bind_options(&schema(), &supplied),
            Err(OptionError::Unknown(_))
        ));

        let supplied = object(json!({"Game Start Timer": "soon", "Force Capture": true}));
        assert!(matches!(
            bind_options(&schema(), &supplied),
            Err(OptionError::WrongType(_))
        ));
    }

    #[test]
    fn enforces_ranges() {
        let supplied = object(json!({"Game Start Timer": -1, "Force Capture": true}));
        assert!(matches!(
            bind_options(&schema(), &supplied),
            Err(OptionError::OutOfRange(_))
        ));
    }
}
