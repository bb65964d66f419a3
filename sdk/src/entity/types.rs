//! Core types for the entity framework

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A caller-supplied scalar value - either text or a 64-bit integer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

/// Literal kinds that can be converted to and from query-language text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralType {
    Uri,
    String,
    Integer,
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralType::Uri => "uri",
            LiteralType::String => "string",
            LiteralType::Integer => "integer",
        };
        write!(f, "{}", name)
    }
}

/// One result row: `?variable` -> raw literal text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(BTreeMap<String, String>);

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful for fixtures and tests
    pub fn with<K: Into<String>, V: Into<String>>(mut self, variable: K, literal: V) -> Self {
        self.0.insert(variable.into(), literal.into());
        self
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(String::as_str)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    pub fn insert(&mut self, variable: String, literal: String) {
        self.0.insert(variable, literal);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Binding {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Filter object handed to an API method: lowercase property name -> value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Params holding only an `id`
    pub fn with_id<V: Into<Value>>(id: V) -> Self {
        Self::new().with("id", id)
    }

    pub fn with<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn id(&self) -> Option<&Value> {
        self.get("id")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Error type for entity operations
#[derive(Error, Debug)]
pub enum EntityError {
    /// No converter is registered for the literal type
    #[error("Can not convert literal of type '{literal_type}'")]
    UnsupportedType { literal_type: String },

    /// A value was bound to a name the entity kind does not declare
    #[error("Variable '{variable}' is not declared for entity '{entity_type}'")]
    UndeclaredVariable {
        entity_type: String,
        variable: String,
    },

    /// A single-result fetch was requested without an id
    #[error("A valid id is required to fetch a single '{entity_type}'")]
    MissingIdentifier { entity_type: String },

    /// A result row could not be turned into an entity
    #[error("Invalid binding for entity '{entity_type}': {reason}")]
    InvalidBinding {
        entity_type: String,
        reason: String,
    },

    /// The data source failed to run the query or failed mid-stream
    #[error("Data source failed for entity '{entity_type}': {reason}")]
    Source {
        entity_type: String,
        reason: String,
    },

    /// The fetch was cancelled through its cancel token
    #[error("Fetch of entity '{entity_type}' was cancelled")]
    Cancelled { entity_type: String },

    /// No method with this name is registered
    #[error("Unknown api method '{method}'")]
    UnknownMethod { method: String },

    /// The method is registered for a different entity kind
    #[error("Api method '{method}' returns '{actual}', not '{expected}'")]
    MethodKindMismatch {
        method: String,
        expected: String,
        actual: String,
    },

    /// The method is registered with the other result mode
    #[error("Api method '{method}' is a {actual} method")]
    ResultModeMismatch { method: String, actual: String },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EntityError {
    /// Create an UnsupportedType error
    pub fn unsupported_type<T: fmt::Display>(literal_type: T) -> Self {
        Self::UnsupportedType {
            literal_type: literal_type.to_string(),
        }
    }

    /// Create an UndeclaredVariable error
    pub fn undeclared_variable<E: AsRef<str>, V: AsRef<str>>(entity_type: E, variable: V) -> Self {
        Self::UndeclaredVariable {
            entity_type: entity_type.as_ref().to_string(),
            variable: variable.as_ref().to_string(),
        }
    }

    /// Create a MissingIdentifier error
    pub fn missing_identifier<E: AsRef<str>>(entity_type: E) -> Self {
        Self::MissingIdentifier {
            entity_type: entity_type.as_ref().to_string(),
        }
    }

    /// Create an InvalidBinding error
    pub fn invalid_binding<E: AsRef<str>, R: AsRef<str>>(entity_type: E, reason: R) -> Self {
        Self::InvalidBinding {
            entity_type: entity_type.as_ref().to_string(),
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a Source error from whatever the data source reported
    pub fn source<E: AsRef<str>, R: fmt::Display>(entity_type: E, reason: R) -> Self {
        Self::Source {
            entity_type: entity_type.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a Cancelled error
    pub fn cancelled<E: AsRef<str>>(entity_type: E) -> Self {
        Self::Cancelled {
            entity_type: entity_type.as_ref().to_string(),
        }
    }

    pub fn unknown_method<M: AsRef<str>>(method: M) -> Self {
        Self::UnknownMethod {
            method: method.as_ref().to_string(),
        }
    }

    pub fn method_kind_mismatch<M: AsRef<str>, E: AsRef<str>, A: AsRef<str>>(
        method: M,
        expected: E,
        actual: A,
    ) -> Self {
        Self::MethodKindMismatch {
            method: method.as_ref().to_string(),
            expected: expected.as_ref().to_string(),
            actual: actual.as_ref().to_string(),
        }
    }

    pub fn result_mode_mismatch<M: AsRef<str>, A: fmt::Display>(method: M, actual: A) -> Self {
        Self::ResultModeMismatch {
            method: method.as_ref().to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an Internal error
    pub fn internal<M: AsRef<str>>(message: M) -> Self {
        Self::Internal {
            message: message.as_ref().to_string(),
        }
    }

    /// Get the entity type associated with this error (if any)
    pub fn entity_type(&self) -> Option<&str> {
        match self {
            Self::UndeclaredVariable { entity_type, .. }
            | Self::MissingIdentifier { entity_type }
            | Self::InvalidBinding { entity_type, .. }
            | Self::Source { entity_type, .. }
            | Self::Cancelled { entity_type } => Some(entity_type),
            Self::MethodKindMismatch { expected, .. } => Some(expected),
            Self::UnsupportedType { .. }
            | Self::UnknownMethod { .. }
            | Self::ResultModeMismatch { .. }
            | Self::Internal { .. } => None,
        }
    }

    /// Check if retrying the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Source { .. } | Self::Cancelled { .. } => true,

            Self::UnsupportedType { .. }
            | Self::UndeclaredVariable { .. }
            | Self::MissingIdentifier { .. }
            | Self::InvalidBinding { .. }
            | Self::UnknownMethod { .. }
            | Self::MethodKindMismatch { .. }
            | Self::ResultModeMismatch { .. }
            | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for entity operations
pub type EntityResult<T> = Result<T, EntityError>;

impl From<anyhow::Error> for EntityError {
    fn from(error: anyhow::Error) -> Self {
        EntityError::Internal {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("Alice").to_string(), "Alice");
        assert_eq!(Value::from(42).to_string(), "42");
    }

    #[test]
    fn test_value_untagged_deserialization() {
        let params: Params = serde_json::from_str(r#"{"id": "http://example.org/1", "age": 30}"#).unwrap();
        assert_eq!(params.id(), Some(&Value::Text("http://example.org/1".to_string())));
        assert_eq!(params.get("age"), Some(&Value::Integer(30)));
    }

    #[test]
    fn test_binding_from_iter() {
        let binding: Binding = [("?id", "<http://example.org/1>"), ("?name", "\"Alice\"")]
            .into_iter()
            .collect();
        assert_eq!(binding.len(), 2);
        assert_eq!(binding.get("?name"), Some("\"Alice\""));
        assert!(!binding.contains("?age"));
    }

    #[test]
    fn test_error_classification() {
        let err = EntityError::missing_identifier("Entity");
        assert_eq!(err.entity_type(), Some("Entity"));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("valid id"));

        let err = EntityError::source("Entity", "connection reset");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Data source failed for entity 'Entity': connection reset"
        );
    }
}
