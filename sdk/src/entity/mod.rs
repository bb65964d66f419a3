//! Entity framework
//!
//! Typed entities backed by query result rows. Each kind declares its
//! property types and a query template; an [`EntityFetcher`] runs the query
//! against a [`DataSource`] and a per-kind [`Factory`] keeps one shared
//! instance per id.

pub mod factory;
pub mod literal;
pub mod query;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use factory::Factory;
pub use literal::{IntegerLiteral, LiteralConverter, LiteralRegistry, StringLiteral, UriLiteral};
pub use query::QueryBuilder;
pub use store::{CancelToken, DataSource, EntityFetcher, RowSender, RowStream, row_channel};
pub use traits::{Accessor, Entity, PropertyTypes};
pub use types::{Binding, EntityError, EntityResult, LiteralType, Params, Value};
