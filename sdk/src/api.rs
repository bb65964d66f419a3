//! Named api methods over an [`EntityFetcher`]
//!
//! A method binds a name to an entity kind, a result mode and the function that
//! turns call parameters into a query. Calls are typed by the entity kind they
//! expect back and fail when that does not match the registration.

use crate::entities::{Episode, GenericEntity, Series};
use crate::entity::literal::LiteralRegistry;
use crate::entity::query::QueryBuilder;
use crate::entity::store::{CancelToken, DataSource, EntityFetcher};
use crate::entity::traits::{Entity, PropertyTypes};
use crate::entity::types::{EntityError, EntityResult, Params};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether a method resolves to one entity or to a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultMode {
    Single,
    Multiple,
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultMode::Single => write!(f, "single"),
            ResultMode::Multiple => write!(f, "multiple"),
        }
    }
}

/// Result of an api call
#[derive(Debug)]
pub enum Fetched<E> {
    One(Option<Arc<E>>),
    Many(Vec<Arc<E>>),
}

impl<E> Fetched<E> {
    pub fn mode(&self) -> ResultMode {
        match self {
            Fetched::One(_) => ResultMode::Single,
            Fetched::Many(_) => ResultMode::Multiple,
        }
    }

    /// Every fetched entity; a single miss is an empty list
    pub fn into_vec(self) -> Vec<Arc<E>> {
        match self {
            Fetched::One(found) => found.into_iter().collect(),
            Fetched::Many(all) => all,
        }
    }
}

/// Builds the query of a method from its call parameters
pub type QueryFn = Arc<dyn Fn(QueryBuilder, &Params) -> EntityResult<String> + Send + Sync>;

/// Wrap a function or closure as a [`QueryFn`]
pub fn query_fn<F>(f: F) -> QueryFn
where
    F: Fn(QueryBuilder, &Params) -> EntityResult<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

struct RegisteredMethod {
    kind: &'static str,
    type_id: TypeId,
    mode: ResultMode,
    types: PropertyTypes,
    query: QueryFn,
}

impl RegisteredMethod {
    fn identifier(&self, params: &Params) -> EntityResult<Option<String>> {
        match self.mode {
            ResultMode::Single => params
                .id()
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| EntityError::missing_identifier(self.kind)),
            ResultMode::Multiple => Ok(None),
        }
    }

    /// Every parameter has to name a declared property of the kind
    fn check_params(&self, params: &Params) -> EntityResult<()> {
        match params.iter().find(|(name, _)| !self.types.contains(name)) {
            Some((name, _)) => Err(EntityError::undeclared_variable(self.kind, name)),
            None => Ok(()),
        }
    }

    fn build_query(&self, literals: Arc<LiteralRegistry>, params: &Params) -> EntityResult<String> {
        let builder = QueryBuilder::new(self.kind, self.types.clone(), literals);
        (self.query)(builder, params)
    }
}

/// Registry of api methods, dispatching calls to one shared fetcher
pub struct Api<S: DataSource> {
    fetcher: EntityFetcher<S>,
    methods: HashMap<String, RegisteredMethod>,
}

impl<S: DataSource> Api<S> {
    /// Create an api without any methods
    pub fn new(fetcher: EntityFetcher<S>) -> Self {
        Self {
            fetcher,
            methods: HashMap::new(),
        }
    }

    /// Create an api with the methods for the built-in entity kinds
    pub fn with_default_methods(fetcher: EntityFetcher<S>) -> Self {
        let mut api = Self::new(fetcher);
        api.register::<GenericEntity>("get_entity_by_id", ResultMode::Single, None);
        api.register::<GenericEntity>("find_entities", ResultMode::Multiple, None);
        api.register::<Series>("get_series_by_id", ResultMode::Single, None);
        api.register::<Series>("find_series", ResultMode::Multiple, None);
        api.register::<Episode>("get_episode_by_id", ResultMode::Single, None);
        api.register::<Episode>(
            "find_episodes_of_series",
            ResultMode::Multiple,
            Some(query_fn(Episode::create_series_query)),
        );
        api
    }

    pub fn fetcher(&self) -> &EntityFetcher<S> {
        &self.fetcher
    }

    /// Register `name` as a method returning entities of kind `E`.
    ///
    /// Without `query` the kind's own template is used. An existing method
    /// with the same name is replaced.
    pub fn register<E: Entity>(&mut self, name: &str, mode: ResultMode, query: Option<QueryFn>) {
        let method = RegisteredMethod {
            kind: E::KIND,
            type_id: TypeId::of::<E>(),
            mode,
            types: E::types(),
            query: query.unwrap_or_else(|| query_fn(E::create_query)),
        };

        if let Some(previous) = self.methods.insert(name.to_string(), method) {
            warn!(
                method = name,
                previous = previous.kind,
                entity = E::KIND,
                "replacing registered api method"
            );
        } else {
            debug!(method = name, entity = E::KIND, %mode, "registered api method");
        }
    }

    /// Names of all registered methods, sorted
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entity kind and result mode of a registered method
    pub fn describe(&self, name: &str) -> Option<(&'static str, ResultMode)> {
        self.methods.get(name).map(|method| (method.kind, method.mode))
    }

    fn method(&self, name: &str) -> EntityResult<&RegisteredMethod> {
        self.methods
            .get(name)
            .ok_or_else(|| EntityError::unknown_method(name))
    }

    fn typed_method<E: Entity>(&self, name: &str) -> EntityResult<&RegisteredMethod> {
        let method = self.method(name)?;
        if method.type_id != TypeId::of::<E>() {
            return Err(EntityError::method_kind_mismatch(name, E::KIND, method.kind));
        }
        Ok(method)
    }

    /// Build the query `name` would run for `params`, without running it
    pub fn build_query(&self, name: &str, params: &Params) -> EntityResult<String> {
        let method = self.method(name)?;
        method.identifier(params)?;
        method.check_params(params)?;
        method.build_query(self.fetcher.literals(), params)
    }

    pub async fn call<E: Entity>(&self, name: &str, params: Params) -> EntityResult<Fetched<E>> {
        self.call_with_cancel(name, params, CancelToken::new()).await
    }

    /// Call `name`; firing `cancel` interrupts a fetch that is waiting for rows
    pub async fn call_with_cancel<E: Entity>(
        &self,
        name: &str,
        params: Params,
        cancel: CancelToken,
    ) -> EntityResult<Fetched<E>> {
        let method = self.typed_method::<E>(name)?;
        let id = method.identifier(&params)?;
        method.check_params(&params)?;
        let query = method.build_query(self.fetcher.literals(), &params)?;
        debug!(method = name, entity = E::KIND, mode = %method.mode, "calling api method");

        match id {
            Some(id) => {
                let found = self
                    .fetcher
                    .fetch_single::<E>(&id, &query, &params, &method.types, &cancel)
                    .await?;
                Ok(Fetched::One(found))
            }
            None => {
                let all = self
                    .fetcher
                    .fetch_multiple::<E>(&query, &params, &method.types, &cancel)
                    .await?;
                Ok(Fetched::Many(all))
            }
        }
    }

    fn expect_mode(&self, name: &str, expected: ResultMode) -> EntityResult<()> {
        let method = self.method(name)?;
        if method.mode != expected {
            return Err(EntityError::result_mode_mismatch(name, method.mode));
        }
        Ok(())
    }

    /// Call a single-result method
    pub async fn get<E: Entity>(&self, name: &str, params: Params) -> EntityResult<Option<Arc<E>>> {
        self.expect_mode(name, ResultMode::Single)?;
        match self.call::<E>(name, params).await? {
            Fetched::One(found) => Ok(found),
            Fetched::Many(_) => Err(EntityError::result_mode_mismatch(name, ResultMode::Multiple)),
        }
    }

    /// Call a multi-result method
    pub async fn find<E: Entity>(&self, name: &str, params: Params) -> EntityResult<Vec<Arc<E>>> {
        self.expect_mode(name, ResultMode::Multiple)?;
        match self.call::<E>(name, params).await? {
            Fetched::Many(all) => Ok(all),
            Fetched::One(_) => Err(EntityError::result_mode_mismatch(name, ResultMode::Single)),
        }
    }
}

impl<S: DataSource> fmt::Debug for Api<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("fetcher", &self.fetcher)
            .field("methods", &self.method_names())
            .finish()
    }
}
