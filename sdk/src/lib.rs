//! Typed entities over a streaming query source.
//!
//! Entity kinds declare their property types and a query template. An
//! [`EntityFetcher`] renders the template, runs it against a [`DataSource`]
//! and hands each result row to the kind's [`Factory`], which keeps exactly
//! one shared instance per id. [`Api`] exposes fetches as named methods.

pub mod api;
pub mod entities;
pub mod entity;
pub mod testing;

// Re-export async_trait macro for implementing DataSource
pub use async_trait::async_trait;

pub use api::{Api, Fetched, QueryFn, ResultMode, query_fn};
pub use entities::{Episode, GenericEntity, Series};
pub use entity::{
    Accessor, Binding, CancelToken, DataSource, Entity, EntityError, EntityFetcher, EntityResult, Factory,
    LiteralConverter, LiteralRegistry, LiteralType, Params, PropertyTypes, QueryBuilder, RowSender, RowStream,
    Value, row_channel,
};
