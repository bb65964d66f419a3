//! Testing support
//!
//! [`MemorySource`] is a [`DataSource`](crate::entity::DataSource) that replays
//! canned rows and records every query it was asked to execute, so fetches can
//! be tested without a query endpoint.
//!
//! ```rust,ignore
//! use fragments_sdk::testing::MemorySource;
//! use fragments_sdk::{Api, Binding, EntityFetcher, GenericEntity, Params};
//!
//! let source = MemorySource::new()
//!     .with_default_rows(vec![Binding::new().with("?name", "\"Alice\"")]);
//! let api = Api::with_default_methods(EntityFetcher::new(source));
//! let entity = api
//!     .get::<GenericEntity>("get_entity_by_id", Params::with_id("http://example.org/e1"))
//!     .await?;
//! ```

pub mod memory_source;

pub use memory_source::MemorySource;
