//! Entity: Entity
//!
//! The generic kind: anything typed `Entity` with a name and an age.

use crate::entity::traits::read_property;
use crate::entity::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericEntity {
    id: String,
    name: Option<String>,
    age: Option<String>,
    #[serde(skip)]
    binding: Binding,
}

impl GenericEntity {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The age as unquoted literal text
    pub fn age(&self) -> Option<&str> {
        self.age.as_deref()
    }

    fn id_property(&self) -> Option<&str> {
        Some(&self.id)
    }
}

static ACCESSORS: [Accessor<GenericEntity>; 3] = [
    Accessor { name: "id", get: GenericEntity::id_property },
    Accessor { name: "name", get: GenericEntity::name },
    Accessor { name: "age", get: GenericEntity::age },
];

impl Entity for GenericEntity {
    const KIND: &'static str = "Entity";

    fn types() -> PropertyTypes {
        PropertyTypes::new()
            .with("id", LiteralType::Uri)
            .with("name", LiteralType::String)
            .with("age", LiteralType::Integer)
    }

    fn create_query(mut builder: QueryBuilder, params: &Params) -> EntityResult<String> {
        builder
            .push("SELECT * WHERE {")
            .push("$ID$ a Entity ;")
            .push("name $NAME$ ;")
            .push("age $AGE$ .")
            .push("}");
        builder.build(params)
    }

    fn from_binding(id: String, binding: Binding, literals: &LiteralRegistry) -> EntityResult<Self> {
        Ok(Self {
            name: read_property(&binding, "name", LiteralType::String, literals)?,
            age: read_property(&binding, "age", LiteralType::Integer, literals)?,
            id,
            binding,
        })
    }

    fn accessors() -> &'static [Accessor<Self>] {
        &ACCESSORS
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }
}
