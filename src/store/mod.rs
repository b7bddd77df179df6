pub mod feed;
pub mod memory;
pub mod postgres;

pub use feed::{SnapshotFeed, Subscription};
pub use memory::MemoryReportStore;
pub use postgres::PgReportStore;

use crate::domain::models::{FloodReport, Observation, VoteChoice};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Realtime collection of report documents.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts a new document. The store picks the id and creation time and
    /// starts both tallies at zero.
    async fn create(&self, observation: Observation) -> Result<FloodReport, StoreError>;

    /// Adds one to the chosen tally. `Ok(None)` when no document has `id`.
    async fn increment_vote(
        &self,
        id: &str,
        choice: VoteChoice,
    ) -> Result<Option<FloodReport>, StoreError>;

    /// Opens a push channel of snapshots ordered by `createdAt` descending.
    fn subscribe(&self) -> Subscription;

    /// Number of live subscriptions.
    fn subscriber_count(&self) -> usize;

    fn backend(&self) -> &'static str;
}
