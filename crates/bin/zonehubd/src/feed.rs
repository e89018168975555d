//! Inbound item-change feed.
//!
//! [`read_stdin`] turns `item value` lines into host changes on the item
//! store; the store echoes real changes onto the bus, and [`run`] drains
//! the bus into the dispatcher.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use zonehub_adapter_virtual::InMemoryItemStore;
use zonehub_app::dispatcher::EventDispatcher;
use zonehub_app::event_bus::ItemChange;

/// Dispatch every change received on `changes` until the bus closes.
pub async fn run(dispatcher: EventDispatcher, mut changes: broadcast::Receiver<ItemChange>) {
    loop {
        match changes.recv().await {
            Ok(ItemChange { item, value }) => {
                match dispatcher.dispatch_item_change(&item, value) {
                    Ok(report) => tracing::debug!(
                        item = %item,
                        invoked = report.invoked.len(),
                        failed = report.failed.len(),
                        skipped = report.skipped,
                        "item change dispatched"
                    ),
                    Err(err) => tracing::warn!(item = %item, %err, "item change dropped"),
                }
            }
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "feed lagging behind, item changes lost");
            }
            Err(RecvError::Closed) => break,
        }
    }
    tracing::debug!("item change feed closed");
}

/// Apply every `item value` line of `reader` to `store`.
///
/// # Errors
///
/// Returns the underlying I/O error when reading fails.
pub async fn read_lines<R>(reader: R, store: Arc<InMemoryItemStore>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut applied = 0;
    while let Some(line) = lines.next_line().await? {
        let Some(ItemChange { item, value }) = ItemChange::parse_line(&line) else {
            continue;
        };
        if store.set(&item, value) {
            applied += 1;
        } else {
            tracing::trace!(item = %item, "value unchanged");
        }
    }
    Ok(applied)
}

/// Feed the store from the process standard input.
///
/// # Errors
///
/// Returns the underlying I/O error when reading stdin fails.
pub async fn read_stdin(store: Arc<InMemoryItemStore>) -> std::io::Result<usize> {
    read_lines(tokio::io::BufReader::new(tokio::io::stdin()), store).await
}
