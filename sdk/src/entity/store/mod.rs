//! Query execution: the data source contract and the entity fetcher

pub mod channel;
pub mod fetcher;
pub mod source;

pub use channel::{RowSender, row_channel};
pub use fetcher::EntityFetcher;
pub use source::{CancelToken, DataSource, RowStream};
