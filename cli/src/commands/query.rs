use super::{Command, EntityKind, build_api};
use crate::utils::FragmentsConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fragments_sdk::{Api, DataSource, Params, ResultMode};

/// Print the query a default api method would run, without running it
pub struct QueryCommand {
    pub kind: EntityKind,
    pub mode: ResultMode,
    pub params: Params,
    pub config: FragmentsConfig,
}

impl QueryCommand {
    pub fn render<S: DataSource>(&self, api: &Api<S>) -> Result<String> {
        let method = self.kind.method(self.mode);
        api.build_query(method, &self.params)
            .with_context(|| format!("Failed to build query for '{}'", method))
    }
}

#[async_trait]
impl Command for QueryCommand {
    async fn execute(&self) -> Result<()> {
        let api = build_api(&self.config)?;
        println!("{}", self.render(&api)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_find_query() {
        let command = QueryCommand {
            kind: EntityKind::Entity,
            mode: ResultMode::Multiple,
            params: Params::new().with("name", "Entity"),
            config: FragmentsConfig::default(),
        };
        let api = build_api(&command.config).unwrap();
        assert_eq!(
            command.render(&api).unwrap(),
            "SELECT * WHERE { ?id a Entity ; name \"Entity\" ; age ?age . }"
        );
    }

    #[test]
    fn test_render_single_query_needs_id() {
        let mut command = QueryCommand {
            kind: EntityKind::Series,
            mode: ResultMode::Single,
            params: Params::new(),
            config: FragmentsConfig::default(),
        };
        let api = build_api(&command.config).unwrap();
        assert!(command.render(&api).is_err());

        command.params = Params::with_id("http://example.org/series/lost");
        assert!(command.render(&api).unwrap().contains("<http://example.org/series/lost> a"));
    }
}
