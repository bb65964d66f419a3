// In-memory data source implementation for testing
use crate::entity::store::channel::{RowSender, row_channel};
use crate::entity::store::source::{DataSource, RowStream};
use crate::entity::types::Binding;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Complete,
    Hang,
    FailStream(String),
    Reject(String),
}

/// Replays canned rows for queries.
///
/// Rows registered for the exact query string win; any other query gets the
/// default rows. Rows are emitted from a spawned task, so they always arrive
/// after `execute` has returned.
#[derive(Debug)]
pub struct MemorySource {
    // query -> rows
    queries: DashMap<String, Vec<Binding>>,
    default_rows: Vec<Binding>,
    behavior: Behavior,
    buffer: usize,
    executed: Mutex<Vec<String>>,
    // senders of hanging executions, kept so their streams never end
    parked: Arc<Mutex<Vec<RowSender>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            queries: DashMap::new(),
            default_rows: Vec::new(),
            behavior: Behavior::Complete,
            buffer: 16,
            executed: Mutex::new(Vec::new()),
            parked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Rows replayed for any query without rows of its own
    pub fn with_default_rows(mut self, rows: Vec<Binding>) -> Self {
        self.default_rows = rows;
        self
    }

    /// Rows replayed for exactly `query`
    pub fn on_query<Q: Into<String>>(self, query: Q, rows: Vec<Binding>) -> Self {
        self.queries.insert(query.into(), rows);
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Emit the rows but never end the stream.
    ///
    /// The sender of every hanging execution is kept until the source is dropped.
    pub fn hanging(mut self) -> Self {
        self.behavior = Behavior::Hang;
        self
    }

    /// Emit the rows, then fail the stream with `message`
    pub fn failing<M: Into<String>>(mut self, message: M) -> Self {
        self.behavior = Behavior::FailStream(message.into());
        self
    }

    /// Refuse to execute any query
    pub fn rejecting<M: Into<String>>(mut self, message: M) -> Self {
        self.behavior = Behavior::Reject(message.into());
        self
    }

    pub fn add_rows<Q: Into<String>>(&self, query: Q, rows: Vec<Binding>) {
        self.queries.entry(query.into()).or_default().extend(rows);
    }

    /// Every query passed to `execute`, in call order
    pub async fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }

    pub async fn execution_count(&self) -> usize {
        self.executed.lock().await.len()
    }

    fn rows_for(&self, query: &str) -> Vec<Binding> {
        self.queries
            .get(query)
            .map(|rows| rows.value().clone())
            .unwrap_or_else(|| self.default_rows.clone())
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn execute(&self, query: &str) -> Result<RowStream> {
        self.executed.lock().await.push(query.to_string());
        if let Behavior::Reject(message) = &self.behavior {
            bail!("{}", message);
        }

        let rows = self.rows_for(query);
        trace!(rows = rows.len(), "replaying rows");
        let (tx, stream) = row_channel(self.buffer);
        let behavior = self.behavior.clone();
        let parked = Arc::clone(&self.parked);

        tokio::spawn(async move {
            for row in rows {
                if tx.row(row).await.is_err() {
                    return;
                }
            }
            match behavior {
                Behavior::Hang => parked.lock().await.push(tx),
                Behavior::FailStream(message) => tx.fail(anyhow!(message)).await,
                Behavior::Complete | Behavior::Reject(_) => tx.done(),
            }
        });

        Ok(stream)
    }
}
