//! Entity: Episode

use crate::entity::traits::read_property;
use crate::entity::*;
use serde::Serialize;

/// One episode of a [`Series`](super::Series)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    id: String,
    title: Option<String>,
    series: Option<String>,
    number: Option<String>,
    #[serde(skip)]
    binding: Binding,
}

impl Episode {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Id of the series this episode belongs to
    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    fn id_property(&self) -> Option<&str> {
        Some(&self.id)
    }

    /// Template selecting the episodes of `params.series`, ordered by episode number
    pub fn create_series_query(mut builder: QueryBuilder, params: &Params) -> EntityResult<String> {
        builder
            .push("SELECT * WHERE {")
            .push("?id a <http://schema.org/TVEpisode> ;")
            .push("<http://schema.org/partOfSeries> $SERIES$ ;")
            .push("<http://schema.org/name> $TITLE$ ;")
            .push("<http://schema.org/episodeNumber> $NUMBER$ .")
            .push("} ORDER BY ?number");
        builder.build(params)
    }
}

static ACCESSORS: [Accessor<Episode>; 4] = [
    Accessor { name: "id", get: Episode::id_property },
    Accessor { name: "title", get: Episode::title },
    Accessor { name: "series", get: Episode::series },
    Accessor { name: "number", get: Episode::number },
];

impl Entity for Episode {
    const KIND: &'static str = "Episode";

    fn types() -> PropertyTypes {
        PropertyTypes::new()
            .with("id", LiteralType::Uri)
            .with("title", LiteralType::String)
            .with("series", LiteralType::Uri)
            .with("number", LiteralType::Integer)
    }

    fn create_query(mut builder: QueryBuilder, params: &Params) -> EntityResult<String> {
        builder
            .push("SELECT * WHERE {")
            .push("$ID$ a <http://schema.org/TVEpisode> ;")
            .push("<http://schema.org/name> $TITLE$ ;")
            .push("<http://schema.org/partOfSeries> $SERIES$ ;")
            .push("<http://schema.org/episodeNumber> $NUMBER$ .")
            .push("}");
        builder.build(params)
    }

    fn from_binding(id: String, binding: Binding, literals: &LiteralRegistry) -> EntityResult<Self> {
        Ok(Self {
            title: read_property(&binding, "title", LiteralType::String, literals)?,
            series: read_property(&binding, "series", LiteralType::Uri, literals)?,
            number: read_property(&binding, "number", LiteralType::Integer, literals)?,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_series_query_binds_series() {
        let builder = QueryBuilder::new(Episode::KIND, Episode::types(), Arc::new(LiteralRegistry::default()));
        let params = Params::new().with("series", "http://example.org/series/lost");
        let query = Episode::create_series_query(builder, &params).unwrap();
        assert_eq!(
            query,
            "SELECT * WHERE { ?id a <http://schema.org/TVEpisode> ; \
             <http://schema.org/partOfSeries> <http://example.org/series/lost> ; \
             <http://schema.org/name> ?title ; \
             <http://schema.org/episodeNumber> ?number . } ORDER BY ?number"
        );
    }
}
