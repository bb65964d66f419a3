//! Fragments CLI Library
//!
//! Programmatic access to the `fragments` commands: configuration and fixture
//! loading, logging setup and the fetch and query commands.

pub mod commands;
pub mod utils;

// Re-export command types for advanced usage
pub use commands::{Command, EntityKind, build_api, fetch::FetchCommand, query::QueryCommand};
pub use utils::{CONFIG_FILE, Fixtures, FragmentsConfig, init_logging};
