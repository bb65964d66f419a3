use super::{Command, EntityKind, build_api};
use crate::utils::FragmentsConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fragments_sdk::{Api, DataSource, Entity, Episode, Fetched, GenericEntity, Params, ResultMode, Series};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::info;

/// Fetch entities through the default api methods and print them as JSON
pub struct FetchCommand {
    pub kind: EntityKind,
    pub mode: ResultMode,
    pub params: Params,
    pub config: FragmentsConfig,
}

impl FetchCommand {
    pub async fn run<S: DataSource>(&self, api: &Api<S>) -> Result<Json> {
        let method = self.kind.method(self.mode);
        info!(method, kind = ?self.kind, "fetching");

        match self.kind {
            EntityKind::Entity => fetch_json::<GenericEntity, S>(api, method, self.params.clone()).await,
            EntityKind::Series => fetch_json::<Series, S>(api, method, self.params.clone()).await,
            EntityKind::Episode => fetch_json::<Episode, S>(api, method, self.params.clone()).await,
        }
    }
}

async fn fetch_json<E, S>(api: &Api<S>, method: &str, params: Params) -> Result<Json>
where
    E: Entity + Serialize,
    S: DataSource,
{
    let fetched = api
        .call::<E>(method, params)
        .await
        .with_context(|| format!("Failed to call '{}'", method))?;

    let json = match fetched {
        Fetched::One(found) => serde_json::to_value(found.as_deref())?,
        Fetched::Many(all) => {
            info!(method, count = all.len(), "fetched entities");
            serde_json::to_value(all.iter().map(|entity| entity.as_ref()).collect::<Vec<_>>())?
        }
    };
    Ok(json)
}

#[async_trait]
impl Command for FetchCommand {
    async fn execute(&self) -> Result<()> {
        let api = build_api(&self.config)?;
        let json = self.run(&api).await?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        Ok(())
    }
}
