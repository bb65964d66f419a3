//! Core traits for the entity framework

use crate::entity::literal::LiteralRegistry;
use crate::entity::query::QueryBuilder;
use crate::entity::types::{Binding, EntityResult, LiteralType, Params};
use std::fmt::Debug;

/// Declared properties of an entity kind, in declaration order.
///
/// Names are unique; inserting an existing name replaces its type in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTypes {
    properties: Vec<(String, LiteralType)>,
}

impl PropertyTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<N: Into<String>>(mut self, name: N, literal_type: LiteralType) -> Self {
        self.insert(name, literal_type);
        self
    }

    pub fn insert<N: Into<String>>(&mut self, name: N, literal_type: LiteralType) {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = literal_type,
            None => self.properties.push((name, literal_type)),
        }
    }

    pub fn get(&self, name: &str) -> Option<LiteralType> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, LiteralType)> for PropertyTypes {
    fn from_iter<I: IntoIterator<Item = (N, LiteralType)>>(iter: I) -> Self {
        let mut types = Self::new();
        for (name, literal_type) in iter {
            types.insert(name, literal_type);
        }
        types
    }
}

/// Read-only accessor for one declared property, shared by every instance of a kind
pub struct Accessor<E> {
    pub name: &'static str,
    pub get: fn(&E) -> Option<&str>,
}

/// Core trait that all entity kinds must implement
pub trait Entity: Debug + Send + Sync + Sized + 'static {
    /// Name of the kind, used for logging and errors
    const KIND: &'static str;

    /// Declared properties and their literal types
    fn types() -> PropertyTypes;

    /// Push this kind's query template onto `builder` and build it with `params`
    fn create_query(builder: QueryBuilder, params: &Params) -> EntityResult<String>;

    /// Build an instance from one (already merged) result row
    fn from_binding(id: String, binding: Binding, literals: &LiteralRegistry) -> EntityResult<Self>;

    /// Accessor table, one entry per declared property
    fn accessors() -> &'static [Accessor<Self>];

    /// Identifier this instance is cached under.
    ///
    /// The `id` accessor reads this value too, not the row's `?id`. The two only
    /// differ when a factory was handed an explicit id.
    fn id(&self) -> &str;

    /// The row this instance was built from
    fn binding(&self) -> &Binding;

    /// Look a property up by name through the accessor table
    fn property(&self, name: &str) -> Option<&str> {
        Self::accessors()
            .iter()
            .find(|accessor| accessor.name == name)
            .and_then(|accessor| (accessor.get)(self))
    }

    /// All declared properties with their current values
    fn properties(&self) -> Vec<(&'static str, Option<&str>)> {
        Self::accessors()
            .iter()
            .map(|accessor| (accessor.name, (accessor.get)(self)))
            .collect()
    }
}

/// Read the declared property `name` out of a binding, converting it under `literal_type`
pub fn read_property(
    binding: &Binding,
    name: &str,
    literal_type: LiteralType,
    literals: &LiteralRegistry,
) -> EntityResult<Option<String>> {
    literals.from_literal(binding.get(&format!("?{}", name)), literal_type)
}
