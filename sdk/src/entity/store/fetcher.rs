//! Fetching entities through a data source and the per-kind factories

use crate::entity::factory::Factory;
use crate::entity::literal::LiteralRegistry;
use crate::entity::store::source::{CancelToken, DataSource, RowStream};
use crate::entity::traits::{Entity, PropertyTypes};
use crate::entity::types::{Binding, EntityError, EntityResult, Params};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, warn};

/// An EntityFetcher fetches one or many entities of a kind, given the query
/// that selects their data, and hands the rows to that kind's [`Factory`].
pub struct EntityFetcher<S: DataSource> {
    source: S,
    literals: Arc<LiteralRegistry>,
    factories: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl<S: DataSource> EntityFetcher<S> {
    /// Create a fetcher over `source` with the default literal converters
    pub fn new(source: S) -> Self {
        Self::with_literals(source, LiteralRegistry::default())
    }

    pub fn with_literals(source: S, literals: LiteralRegistry) -> Self {
        Self {
            source,
            literals: Arc::new(literals),
            factories: DashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn literals(&self) -> Arc<LiteralRegistry> {
        Arc::clone(&self.literals)
    }

    /// Get or create the factory for entities of type `E`
    pub fn factory<E: Entity>(&self) -> EntityResult<Arc<Factory<E>>> {
        let factory = self
            .factories
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                debug!(entity = E::KIND, "creating factory");
                Arc::new(Factory::<E>::new(self.literals())) as Arc<dyn Any + Send + Sync>
            })
            .value()
            .clone();

        factory
            .downcast::<Factory<E>>()
            .map_err(|_| EntityError::internal(format!("factory type mismatch for '{}'", E::KIND)))
    }

    async fn execute<E: Entity>(&self, query: &str, cancel: &CancelToken) -> EntityResult<RowStream> {
        debug!(entity = E::KIND, %query, "executing query");
        match self.source.execute(query).await {
            Ok(rows) => Ok(rows.with_cancel(cancel.clone())),
            Err(e) => {
                warn!(entity = E::KIND, error = %e, "data source failed to execute query");
                Err(EntityError::source(E::KIND, e))
            }
        }
    }

    /// Add every default the row does not bind yet, as a literal of its declared type.
    /// Values already in the row win over defaults.
    pub fn extend_binding<E: Entity>(
        &self,
        mut data: Binding,
        default_data: &Params,
        types: &PropertyTypes,
    ) -> EntityResult<Binding> {
        for (key, value) in default_data.iter() {
            let variable = format!("?{}", key);
            if data.contains(&variable) {
                continue;
            }
            let literal_type = types
                .get(key)
                .ok_or_else(|| EntityError::undeclared_variable(E::KIND, key))?;
            if let Some(literal) = self.literals.to_literal(Some(value), literal_type)? {
                data.insert(variable, literal);
            }
        }
        Ok(data)
    }

    /// Fetch a single entity of type `E` with the given id.
    ///
    /// A cached instance is returned without running `query`. Otherwise the last
    /// row the query yields (merged with `default_data`) becomes the entity;
    /// no rows resolves to `None`.
    pub async fn fetch_single<E: Entity>(
        &self,
        id: &str,
        query: &str,
        default_data: &Params,
        types: &PropertyTypes,
        cancel: &CancelToken,
    ) -> EntityResult<Option<Arc<E>>> {
        let factory = self.factory::<E>()?;

        factory
            .create_async(id, move || async move {
                let mut rows = self.execute::<E>(query, cancel).await?;
                let mut found = None;
                let mut count = 0usize;
                while let Some(row) = rows.next_row(E::KIND).await? {
                    found = Some(self.extend_binding::<E>(row, default_data, types)?);
                    count += 1;
                }
                debug!(entity = E::KIND, id, rows = count, "single fetch complete");
                Ok(found)
            })
            .await
    }

    /// Fetch every entity of type `E` the query yields, in row order.
    ///
    /// Instances are only cached once the stream has ended and every row
    /// converted, so a failed fetch caches nothing.
    pub async fn fetch_multiple<E: Entity>(
        &self,
        query: &str,
        default_data: &Params,
        types: &PropertyTypes,
        cancel: &CancelToken,
    ) -> EntityResult<Vec<Arc<E>>> {
        let factory = self.factory::<E>()?;
        let mut rows = self.execute::<E>(query, cancel).await?;

        let mut merged = Vec::new();
        while let Some(row) = rows.next_row(E::KIND).await? {
            merged.push(self.extend_binding::<E>(row, default_data, types)?);
        }
        let entities = factory.create_batch(merged)?;

        debug!(entity = E::KIND, count = entities.len(), "multiple fetch complete");
        Ok(entities)
    }
}

impl<S: DataSource> std::fmt::Debug for EntityFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityFetcher")
            .field("literals", &self.literals)
            .field("factories", &self.factories.len())
            .finish()
    }
}
