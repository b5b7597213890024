//! Reactive read subscriptions.
//!
//! The UI reads through live queries: a query closure is re-invoked
//! whenever a table it depends on changes, and the full recomputed value is
//! delivered through a watch channel. There is no incremental update; each
//! delivery is a fresh run of the query.
//!
//! Change notifications fan out over a broadcast channel. They are emitted
//! only after a write commits, so a re-run never observes a half-applied
//! transaction.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::{Database, DbError};

/// Tables a write can touch, for scoping live-query re-runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Seasons,
    Swimmers,
    Meets,
    EventDefs,
    IndividualResults,
    RelayResults,
    Records,
    Settings,
    AuditLog,
}

/// A committed change to one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub table: Table,
}

/// Fan-out of committed changes to subscribers.
///
/// Cheap to clone; all clones share one broadcast channel.
#[derive(Debug, Clone)]
pub(crate) struct ChangeNotifier {
    tx: broadcast::Sender<Change>,
}

// Bounded: a lagging subscriber re-runs its query anyway, so dropped
// notifications only coalesce re-runs.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publishes a committed change. No-op when nobody is subscribed.
    pub(crate) fn publish(&self, table: Table) {
        let _ = self.tx.send(Change { table });
    }

    /// Publishes one change per table touched by a committed transaction.
    pub(crate) fn publish_all(&self, tables: &[Table]) {
        for table in tables {
            self.publish(*table);
        }
    }

    pub(crate) fn subscribe(&self) -> ChangeStream {
        ChangeStream {
            rx: self.tx.subscribe(),
        }
    }
}

/// A subscription to committed-change notifications.
///
/// Dropping the stream unsubscribes.
pub struct ChangeStream {
    rx: broadcast::Receiver<Change>,
}

impl ChangeStream {
    /// Waits for the next committed change.
    ///
    /// Returns `None` when the database (and thus the sender) is gone.
    /// A lagged subscriber skips ahead rather than erroring: the next
    /// available change is returned and intermediate ones are coalesced.
    pub async fn next(&mut self) -> Option<Change> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "change stream lagged, coalescing");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Handle to a running live query.
///
/// Holds the receiving end of a watch channel with the latest query value.
/// Cancellation is explicit ([`Self::unsubscribe`]) or by drop.
pub struct LiveQueryHandle<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T: Clone> LiveQueryHandle<T> {
    /// The most recently computed value.
    #[must_use]
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits until the value is recomputed, then returns it.
    ///
    /// Returns `None` if the query task has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stops the background query task.
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl<T> Drop for LiveQueryHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a live query over `db`.
///
/// `query` runs once immediately for the initial value, then again after
/// every committed change to one of `tables`. Query errors are logged and
/// the previous value is kept, mirroring how the UI treated a failed
/// re-read as transient.
///
/// # Errors
///
/// Returns the error from the initial query run; a subscription is only
/// established once a first value exists.
pub fn spawn_live_query<T, F>(
    db: &Arc<Mutex<Database>>,
    tables: Vec<Table>,
    query: F,
) -> Result<LiveQueryHandle<T>, DbError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Database) -> Result<T, DbError> + Send + 'static,
{
    let (mut changes, initial) = {
        let guard = db.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        (guard.subscribe(), query(&guard)?)
    };
    let (tx, rx) = watch::channel(initial);
    let db = Arc::clone(db);

    let task = tokio::spawn(async move {
        while let Some(change) = changes.next().await {
            if !tables.contains(&change.table) {
                continue;
            }
            let recomputed = {
                let guard = db.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                query(&guard)
            };
            match recomputed {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        // All handles dropped.
                        return;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "live query re-run failed");
                }
            }
        }
    });

    Ok(LiveQueryHandle { rx, task })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn change_stream_delivers_published_changes() {
        let notifier = ChangeNotifier::new();
        let mut stream = notifier.subscribe();

        notifier.publish(Table::IndividualResults);
        let change = stream.next().await.unwrap();
        assert_eq!(change.table, Table::IndividualResults);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let notifier = ChangeNotifier::new();
        notifier.publish(Table::Settings);
        // Subscribing afterwards sees nothing from the past.
        let mut stream = notifier.subscribe();
        notifier.publish(Table::Meets);
        assert_eq!(stream.next().await.unwrap().table, Table::Meets);
    }

    #[tokio::test]
    async fn dropped_notifier_closes_stream() {
        let notifier = ChangeNotifier::new();
        let mut stream = notifier.subscribe();
        drop(notifier);
        assert!(stream.next().await.is_none());
    }
}
