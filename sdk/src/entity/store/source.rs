//! Streaming data source abstraction for query execution

use crate::entity::types::{Binding, EntityError, EntityResult};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Trait for anything that can execute a query and stream back its result rows
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Start executing `query`. Rows are pulled from the returned stream.
    async fn execute(&self, query: &str) -> Result<RowStream>;
}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    async fn execute(&self, query: &str) -> Result<RowStream> {
        (**self).execute(query).await
    }
}

/// Cooperative cancellation shared between a caller and a running fetch
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancelToken::cancel`] has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Ordered rows of one query execution, followed by exactly one end.
///
/// After [`RowStream::next_row`] has returned `Ok(None)` or an error it keeps
/// returning `Ok(None)`; no row is ever produced after the end.
pub struct RowStream {
    rows: BoxStream<'static, Result<Binding>>,
    cancel: CancelToken,
    finished: bool,
}

impl RowStream {
    pub fn new(rows: BoxStream<'static, Result<Binding>>) -> Self {
        Self {
            rows,
            cancel: CancelToken::new(),
            finished: false,
        }
    }

    /// A stream replaying `rows` as-is
    pub fn from_rows(rows: Vec<Binding>) -> Self {
        Self::new(stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    /// A stream that never produces a row nor ends
    pub fn pending() -> Self {
        Self::new(stream::pending().boxed())
    }

    /// Attach a cancel token; a pending pull fails once it fires
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pull the next row. `entity_type` only labels errors.
    pub async fn next_row(&mut self, entity_type: &str) -> EntityResult<Option<Binding>> {
        if self.finished {
            return Ok(None);
        }
        if self.cancel.is_cancelled() {
            self.finished = true;
            return Err(EntityError::cancelled(entity_type));
        }

        let cancel = self.cancel.clone();
        let pulled = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = self.rows.next() => Some(next),
        };
        let Some(next) = pulled else {
            self.finished = true;
            return Err(EntityError::cancelled(entity_type));
        };

        match next {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => {
                self.finished = true;
                Err(EntityError::source(entity_type, e))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("finished", &self.finished)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
