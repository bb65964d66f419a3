//! Push-side adapter: producers emit rows into a channel, consumers pull a [`RowStream`]

use crate::entity::store::source::RowStream;
use crate::entity::types::Binding;
use anyhow::{Result, anyhow};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Create a connected sender/stream pair holding up to `buffer` undelivered rows
pub fn row_channel(buffer: usize) -> (RowSender, RowStream) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let rows = RowStream::new(ReceiverStream::new(rx).boxed());
    (RowSender { tx }, rows)
}

/// Producer half of [`row_channel`].
///
/// `done` and `fail` consume the sender, so nothing can be emitted after the end.
#[derive(Debug)]
pub struct RowSender {
    tx: mpsc::Sender<Result<Binding>>,
}

impl RowSender {
    /// Emit one row, waiting for buffer space
    pub async fn row(&self, row: Binding) -> Result<()> {
        self.tx
            .send(Ok(row))
            .await
            .map_err(|_| anyhow!("row stream was dropped"))
    }

    /// End the stream normally
    pub fn done(self) {}

    /// End the stream with a failure
    pub async fn fail(self, error: anyhow::Error) {
        // nobody is listening anymore if this fails
        let _ = self.tx.send(Err(error)).await;
    }

    /// True once the consuming stream has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
