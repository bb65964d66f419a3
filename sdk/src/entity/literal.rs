//! Conversion of values to and from query-language literals

use crate::entity::types::{EntityError, EntityResult, LiteralType, Value};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Datatype IRI appended to integer literals
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// A quoted string followed by anything (language tag, datatype suffix)
static QUOTED_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)".*$"#).expect("quoted literal pattern is valid"));

/// A bidirectional conversion between values and literal text for one literal type
pub trait LiteralConverter: Send + Sync {
    fn to_literal(&self, value: &Value) -> String;

    fn from_literal(&self, literal: &str) -> String;
}

/// `<value>`
#[derive(Debug, Clone, Copy, Default)]
pub struct UriLiteral;

impl LiteralConverter for UriLiteral {
    fn to_literal(&self, value: &Value) -> String {
        format!("<{}>", value)
    }

    fn from_literal(&self, literal: &str) -> String {
        let mut chars = literal.chars();
        chars.next();
        chars.next_back();
        chars.as_str().to_string()
    }
}

/// `"value"`
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLiteral;

impl LiteralConverter for StringLiteral {
    fn to_literal(&self, value: &Value) -> String {
        format!("\"{}\"", value)
    }

    fn from_literal(&self, literal: &str) -> String {
        QUOTED_LITERAL_RE.replace(literal, "$1").into_owned()
    }
}

/// `"value"^^xsd:integer`, read back as its unquoted text
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerLiteral;

impl LiteralConverter for IntegerLiteral {
    fn to_literal(&self, value: &Value) -> String {
        format!("\"{}\"^^{}", value, XSD_INTEGER)
    }

    fn from_literal(&self, literal: &str) -> String {
        StringLiteral.from_literal(literal)
    }
}

/// Registry of literal converters keyed by literal type.
///
/// [`LiteralRegistry::default`] knows every [`LiteralType`]; [`LiteralRegistry::new`]
/// starts empty, and lookups of unregistered types fail with
/// [`EntityError::UnsupportedType`]. Absent values and literals are passed through
/// untouched before the converter lookup happens.
#[derive(Clone)]
pub struct LiteralRegistry {
    converters: HashMap<LiteralType, Arc<dyn LiteralConverter>>,
}

impl LiteralRegistry {
    /// Create a registry without any converters
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register (or replace) the converter for a literal type
    pub fn register<C: LiteralConverter + 'static>(&mut self, literal_type: LiteralType, converter: C) {
        self.converters.insert(literal_type, Arc::new(converter));
    }

    /// Check whether a converter is registered for the type
    pub fn supports(&self, literal_type: LiteralType) -> bool {
        self.converters.contains_key(&literal_type)
    }

    fn converter(&self, literal_type: LiteralType) -> EntityResult<&Arc<dyn LiteralConverter>> {
        self.converters
            .get(&literal_type)
            .ok_or_else(|| EntityError::unsupported_type(literal_type))
    }

    /// Convert a value to its literal text
    pub fn to_literal(&self, value: Option<&Value>, literal_type: LiteralType) -> EntityResult<Option<String>> {
        let Some(value) = value else {
            return Ok(None);
        };
        Ok(Some(self.converter(literal_type)?.to_literal(value)))
    }

    /// Convert literal text back to its plain value text
    pub fn from_literal(&self, literal: Option<&str>, literal_type: LiteralType) -> EntityResult<Option<String>> {
        let Some(literal) = literal else {
            return Ok(None);
        };
        Ok(Some(self.converter(literal_type)?.from_literal(literal)))
    }
}

impl Default for LiteralRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(LiteralType::Uri, UriLiteral);
        registry.register(LiteralType::String, StringLiteral);
        registry.register(LiteralType::Integer, IntegerLiteral);
        registry
    }
}

impl std::fmt::Debug for LiteralRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.converters.keys().collect();
        types.sort();
        f.debug_struct("LiteralRegistry").field("types", &types).finish()
    }
}
