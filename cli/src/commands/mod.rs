pub mod fetch;
pub mod query;

use crate::utils::{FragmentsConfig, Fixtures};
use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use fragments_sdk::testing::MemorySource;
use fragments_sdk::{Api, EntityFetcher, ResultMode};
use tracing::warn;

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Entity kinds reachable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Entity,
    Series,
    Episode,
}

impl EntityKind {
    /// Default api method of this kind for `mode`
    pub fn method(self, mode: ResultMode) -> &'static str {
        match (self, mode) {
            (EntityKind::Entity, ResultMode::Single) => "get_entity_by_id",
            (EntityKind::Entity, ResultMode::Multiple) => "find_entities",
            (EntityKind::Series, ResultMode::Single) => "get_series_by_id",
            (EntityKind::Series, ResultMode::Multiple) => "find_series",
            (EntityKind::Episode, ResultMode::Single) => "get_episode_by_id",
            (EntityKind::Episode, ResultMode::Multiple) => "find_episodes_of_series",
        }
    }
}

/// Api with the default methods over the configured fixtures
pub fn build_api(config: &FragmentsConfig) -> Result<Api<MemorySource>> {
    let source = match &config.fixtures {
        Some(path) => Fixtures::load_from_path(path)?.into_source(config.buffer),
        None => {
            warn!("no fixtures configured, every query returns no rows");
            MemorySource::new().with_buffer(config.buffer)
        }
    };
    Ok(Api::with_default_methods(EntityFetcher::new(source)))
}
