//! Entity: Series

use crate::entity::traits::read_property;
use crate::entity::*;
use serde::Serialize;

/// A TV series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    id: String,
    title: Option<String>,
    seasons: Option<String>,
    #[serde(skip)]
    binding: Binding,
}

impl Series {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Number of seasons, as unquoted literal text
    pub fn seasons(&self) -> Option<&str> {
        self.seasons.as_deref()
    }

    fn id_property(&self) -> Option<&str> {
        Some(&self.id)
    }
}

static ACCESSORS: [Accessor<Series>; 3] = [
    Accessor { name: "id", get: Series::id_property },
    Accessor { name: "title", get: Series::title },
    Accessor { name: "seasons", get: Series::seasons },
];

impl Entity for Series {
    const KIND: &'static str = "Series";

    fn types() -> PropertyTypes {
        PropertyTypes::new()
            .with("id", LiteralType::Uri)
            .with("title", LiteralType::String)
            .with("seasons", LiteralType::Integer)
    }

    fn create_query(mut builder: QueryBuilder, params: &Params) -> EntityResult<String> {
        builder
            .push("SELECT * WHERE {")
            .push("$ID$ a <http://schema.org/TVSeries> ;")
            .push("<http://schema.org/name> $TITLE$ ;")
            .push("<http://schema.org/numberOfSeasons> $SEASONS$ .")
            .push("}");
        builder.build(params)
    }

    fn from_binding(id: String, binding: Binding, literals: &LiteralRegistry) -> EntityResult<Self> {
        Ok(Self {
            title: read_property(&binding, "title", LiteralType::String, literals)?,
            seasons: read_property(&binding, "seasons", LiteralType::Integer, literals)?,
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
