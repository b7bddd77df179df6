use crate::domain::lifecycle::ReportSet;
use crate::domain::models::{FloodReport, RawReport, VoteChoice};
use crate::store::Subscription;
use crate::time_utils::now_millis;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;

/// Shared active report set, kept current by one store subscription.
#[derive(Clone, Default)]
pub struct ReportBoard {
    inner: Arc<RwLock<ReportSet>>,
}

impl ReportBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> ReportSet {
        self.inner.read().await.clone()
    }

    /// Takes a snapshot and drops whatever is already past its TTL.
    pub async fn ingest(&self, raw: &[RawReport], now_ms: i64) {
        let mut set = self.inner.write().await;
        *set = set.ingest(raw, now_ms).prune(now_ms);
    }

    /// Returns how many reports expired.
    pub async fn prune(&self, now_ms: i64) -> usize {
        let mut set = self.inner.write().await;
        let before = set.len();
        *set = set.prune(now_ms);
        before - set.len()
    }

    pub async fn add(&self, report: FloodReport) {
        let mut set = self.inner.write().await;
        *set = set.add(report);
    }

    /// Counts a vote the store has accepted. `stored` is the store's copy
    /// after the write; if the feed already delivered it, the board is left
    /// as is. Returns whether the board changed.
    pub async fn vote(&self, stored: &FloodReport, choice: VoteChoice) -> bool {
        let mut set = self.inner.write().await;
        let behind = set
            .get(&stored.id)
            .is_some_and(|r| choice.tally(r) < choice.tally(stored));
        if !behind {
            return false;
        }
        let (next, applied) = set.vote(&stored.id, choice);
        *set = next;
        applied
    }

    /// Feeds every snapshot from `subscription` into the board until the
    /// returned handle is shut down or the store goes away.
    pub fn attach(&self, mut subscription: Subscription) -> BoardFeed {
        let board = self.clone();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            tracing::info!(subscription = subscription.id(), "report board attached");
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    snapshot = subscription.next() => {
                        let Some(snapshot) = snapshot else {
                            tracing::warn!("report feed closed");
                            break;
                        };
                        board.ingest(&snapshot, now_millis()).await;
                        tracing::debug!(documents = snapshot.len(), "report board refreshed");
                    }
                }
            }
            subscription.unsubscribe();
        });
        BoardFeed {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Running subscription task of a [`ReportBoard`].
pub struct BoardFeed {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl BoardFeed {
    /// Stops the feed and waits for the subscription to be released.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("report board task ended abnormally: {}", e);
        }
    }
}
