//! Identity-caching factory for entities of one kind

use crate::entity::literal::LiteralRegistry;
use crate::entity::traits::Entity;
use crate::entity::types::{Binding, EntityError, EntityResult, LiteralType};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A Factory creates entities of type `E`.
///
/// A new instance is only built when no instance with the same id exists yet,
/// so every caller asking for the same id shares one `Arc<E>`. Entries are
/// never evicted or replaced.
pub struct Factory<E: Entity> {
    cache: DashMap<String, Arc<E>>,
    literals: Arc<LiteralRegistry>,
}

impl<E: Entity> Factory<E> {
    pub fn new(literals: Arc<LiteralRegistry>) -> Self {
        Self {
            cache: DashMap::new(),
            literals,
        }
    }

    /// Get the cached instance for `id`, if any
    pub fn get(&self, id: &str) -> Option<Arc<E>> {
        self.cache.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    // first writer wins, a concurrently built duplicate is dropped
    fn keep(&self, id: String, entity: E) -> Arc<E> {
        let entry = self.cache.entry(id).or_insert_with(|| Arc::new(entity));
        Arc::clone(entry.value())
    }

    fn build(&self, id: String, data: Binding) -> EntityResult<Arc<E>> {
        let entity = E::from_binding(id.clone(), data, &self.literals)?;
        if self.contains(&id) {
            debug!(entity = E::KIND, %id, "instance already cached, dropping duplicate");
        }
        Ok(self.keep(id, entity))
    }

    fn row_id(&self, data: &Binding) -> EntityResult<String> {
        self.literals
            .from_literal(data.get("?id"), LiteralType::Uri)?
            .ok_or_else(|| EntityError::invalid_binding(E::KIND, "row has no ?id binding"))
    }

    /// Return the instance for `id`, building it from `data` when it is not cached yet.
    ///
    /// When `id` is `None` it is read from the `?id` variable of `data`.
    pub fn create_sync(&self, id: Option<&str>, data: Binding) -> EntityResult<Arc<E>> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.row_id(&data)?,
        };

        if let Some(entity) = self.get(&id) {
            return Ok(entity);
        }
        self.build(id, data)
    }

    /// Like [`Factory::create_sync`] for every row, ids read from `?id`.
    ///
    /// All rows are converted before any instance is cached, so a failing row
    /// leaves the cache untouched.
    pub fn create_batch(&self, rows: Vec<Binding>) -> EntityResult<Vec<Arc<E>>> {
        let mut pending = Vec::with_capacity(rows.len());
        for data in rows {
            let id = self.row_id(&data)?;
            let entry = match self.get(&id) {
                Some(cached) => Pending::Cached(cached),
                None => Pending::Built(id.clone(), E::from_binding(id, data, &self.literals)?),
            };
            pending.push(entry);
        }

        Ok(pending
            .into_iter()
            .map(|entry| match entry {
                Pending::Cached(entity) => entity,
                Pending::Built(id, entity) => self.keep(id, entity),
            })
            .collect())
    }

    /// Return the instance for `id`, awaiting `fetch_data` for its row when it is not cached.
    ///
    /// Resolves to `None` when `fetch_data` finds no row. Concurrent calls for the
    /// same uncached id each run their own `fetch_data`.
    pub async fn create_async<F, Fut>(&self, id: &str, fetch_data: F) -> EntityResult<Option<Arc<E>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EntityResult<Option<Binding>>>,
    {
        if let Some(entity) = self.get(id) {
            debug!(entity = E::KIND, id, "cache hit");
            return Ok(Some(entity));
        }

        match fetch_data().await? {
            Some(data) => self.build(id.to_string(), data).map(Some),
            None => {
                debug!(entity = E::KIND, id, "not found");
                Ok(None)
            }
        }
    }
}

enum Pending<E> {
    Cached(Arc<E>),
    Built(String, E),
}

impl<E: Entity> std::fmt::Debug for Factory<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("entity", &E::KIND)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GenericEntity;

    fn factory() -> Factory<GenericEntity> {
        Factory::new(Arc::new(LiteralRegistry::default()))
    }

    fn row(id: &str, name: &str) -> Binding {
        Binding::new()
            .with("?id", format!("<{}>", id))
            .with("?name", format!("\"{}\"", name))
    }

    #[test]
    fn test_create_sync_derives_id_and_caches() {
        let factory = factory();
        let first = factory.create_sync(None, row("http://example.org/1", "Alice")).unwrap();
        assert_eq!(first.id(), "http://example.org/1");
        assert_eq!(first.name(), Some("Alice"));

        // a second row for the same id does not update the cached instance
        let second = factory.create_sync(None, row("http://example.org/1", "Bob")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), Some("Alice"));
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_create_sync_with_explicit_id() {
        let factory = factory();
        let entity = factory.create_sync(Some("custom"), row("http://example.org/1", "Alice")).unwrap();
        assert_eq!(entity.id(), "custom");
        assert!(factory.contains("custom"));
        assert!(!factory.contains("http://example.org/1"));
    }

    #[test]
    fn test_create_sync_without_id_binding() {
        let factory = factory();
        let err = factory
            .create_sync(None, Binding::new().with("?name", "\"Alice\""))
            .unwrap_err();
        assert!(matches!(err, EntityError::InvalidBinding { .. }));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_create_batch_keeps_row_order_and_identity() {
        let factory = factory();
        let cached = factory.create_sync(None, row("http://example.org/2", "Bob")).unwrap();

        let batch = factory
            .create_batch(vec![
                row("http://example.org/1", "Alice"),
                row("http://example.org/2", "Robert"),
                row("http://example.org/1", "Alicia"),
            ])
            .unwrap();
        let names: Vec<_> = batch.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec![Some("Alice"), Some("Bob"), Some("Alice")]);
        assert!(Arc::ptr_eq(&batch[1], &cached));
        assert!(Arc::ptr_eq(&batch[0], &batch[2]));
        assert_eq!(factory.len(), 2);
    }

    #[test]
    fn test_create_batch_failure_caches_nothing() {
        let factory = factory();
        let err = factory
            .create_batch(vec![
                row("http://example.org/1", "Alice"),
                Binding::new().with("?name", "\"Nobody\""),
            ])
            .unwrap_err();
        assert!(matches!(err, EntityError::InvalidBinding { .. }));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_id_property_is_the_cache_key() {
        let factory = factory();
        let entity = factory.create_sync(Some("custom"), row("http://example.org/1", "Alice")).unwrap();
        assert_eq!(entity.property("id"), Some("custom"));
        assert_eq!(entity.binding().get("?id"), Some("<http://example.org/1>"));
    }

    #[tokio::test]
    async fn test_create_async_cache_hit_skips_fetch() {
        let factory = factory();
        let cached = factory.create_sync(None, row("http://example.org/1", "Alice")).unwrap();

        let mut fetched = false;
        let found = factory
            .create_async("http://example.org/1", || {
                fetched = true;
                async { Ok(None) }
            })
            .await
            .unwrap()
            .unwrap();
        assert!(!fetched);
        assert!(Arc::ptr_eq(&cached, &found));
    }

    #[tokio::test]
    async fn test_create_async_builds_and_caches() {
        let factory = factory();
        let created = factory
            .create_async("http://example.org/2", || async {
                Ok(Some(row("http://example.org/2", "Bob")))
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name(), Some("Bob"));

        let again = factory.get("http://example.org/2").unwrap();
        assert!(Arc::ptr_eq(&created, &again));
    }

    #[tokio::test]
    async fn test_create_async_not_found() {
        let factory = factory();
        let missing = factory
            .create_async("http://example.org/3", || async { Ok(None) })
            .await
            .unwrap();
        assert!(missing.is_none());
        assert!(factory.is_empty());
    }

    #[tokio::test]
    async fn test_create_async_propagates_fetch_errors() {
        let factory = factory();
        let err = factory
            .create_async("http://example.org/4", || async {
                Err(EntityError::source("Entity", "boom"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EntityError::Source { .. }));
    }
}
