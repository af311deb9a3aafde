use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "Value", into = "Value")]
/// Decoded Jira field value.
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Object(BTreeMap<String, FieldValue>),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Builds a numeric value, mapping non-finite input to `Null`.
    pub fn number(value: f64) -> Self {
        Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or(Self::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, FieldValue)>) -> Self {
        Self::Object(
            properties
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up a property on an object value.
    pub fn property(&self, key: &str) -> Option<&FieldValue> {
        match self {
            Self::Object(properties) => properties.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
            Self::String(text) => Value::String(text.clone()),
            Self::Object(properties) => Value::Object(
                properties
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            Value::Object(properties) => Self::Object(
                properties
                    .into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.into_iter().map(FieldValue::from).collect()),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        value.to_json()
    }
}

impl fmt::Display for FieldValue {
    /// Strings render verbatim; everything else renders as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(text) => f.write_str(text),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
/// Field values of a single issue keyed by field id.
///
/// A set is never patched in place; narrower re-fetches produce a new set that
/// replaces the previous one.
pub struct FieldSet(BTreeMap<String, FieldValue>);

impl FieldSet {
    /// Decodes the `fields` object of an issue payload. Non-object payloads yield `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(properties) => Some(Self(
                properties
                    .into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            )),
            _ => None,
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.0.get(field_id)
    }

    /// Field ids sorted case-insensitively.
    pub fn field_ids(&self) -> Vec<&str> {
        let mut ids = self.0.keys().map(String::as_str).collect::<Vec<_>>();
        ids.sort_by_key(|id| id.to_lowercase());
        ids
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (K, FieldValue)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}
