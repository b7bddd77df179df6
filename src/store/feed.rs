use crate::domain::models::RawReport;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

pub type Snapshot = Arc<Vec<RawReport>>;

/// Fan-out of whole-collection snapshots to any number of subscribers.
///
/// Only the latest snapshot is kept; a slow subscriber skips intermediate
/// ones and always sees the newest state.
pub struct SnapshotFeed {
    tx: watch::Sender<Snapshot>,
    subscribers: Arc<AtomicUsize>,
    next_id: AtomicU64,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self {
            tx,
            subscribers: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn publish(&self, docs: Vec<RawReport>) {
        self.tx.send_replace(Arc::new(docs));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let active = self.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(subscription = id, active, "report feed subscribed");
        Subscription {
            id,
            rx: self.tx.subscribe(),
            primed: false,
            subscribers: self.subscribers.clone(),
        }
    }
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on a live report feed. Released on `unsubscribe` or drop.
pub struct Subscription {
    id: u64,
    rx: watch::Receiver<Snapshot>,
    primed: bool,
    subscribers: Arc<AtomicUsize>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Yields the current snapshot first, then one per change. `None` once
    /// the store side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        tracing::info!(subscription = self.id, "report feed unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(subscription = self.id, remaining, "report feed released");
    }
}
