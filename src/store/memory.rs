use crate::domain::lifecycle;
use crate::domain::models::{FloodReport, Observation, RawReport, VoteChoice};
use crate::store::{ReportStore, SnapshotFeed, StoreError, Subscription};
use crate::time_utils::now_millis;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store, used when no database is configured.
pub struct MemoryReportStore {
    docs: RwLock<Vec<RawReport>>,
    feed: SnapshotFeed,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            feed: SnapshotFeed::new(),
        }
    }

    /// Seeds documents as-is, e.g. ones missing a creation time.
    #[cfg(test)]
    pub async fn insert_raw(&self, doc: RawReport) {
        let mut docs = self.docs.write().await;
        docs.push(doc);
        self.publish(&mut docs);
    }

    fn publish(&self, docs: &mut [RawReport]) {
        // Undated documents sort as newest.
        docs.sort_by(|a, b| {
            b.created_at
                .unwrap_or(i64::MAX)
                .cmp(&a.created_at.unwrap_or(i64::MAX))
        });
        self.feed.publish(docs.to_vec());
    }
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create(&self, observation: Observation) -> Result<FloodReport, StoreError> {
        let report = lifecycle::create(observation, Uuid::new_v4().to_string(), now_millis());
        let mut docs = self.docs.write().await;
        docs.push(RawReport::from(report.clone()));
        self.publish(&mut docs);
        tracing::info!(report_id = %report.id, level = report.water_level.as_str(), "report created");
        Ok(report)
    }

    async fn increment_vote(
        &self,
        id: &str,
        choice: VoteChoice,
    ) -> Result<Option<FloodReport>, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        choice.apply(&mut doc.confirms, &mut doc.rejects);
        let updated = doc.clone().into_report(now_millis());
        self.publish(&mut docs);
        Ok(Some(updated))
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{VehicleType, WaterLevel};

    fn observation(level: WaterLevel) -> Observation {
        Observation {
            latitude: 18.48,
            longitude: -69.93,
            water_level: level,
            recommended_vehicles: vec![VehicleType::Jeepeta],
            comment: Some("carril izquierdo libre".to_string()),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_zero_tallies() {
        let store = MemoryReportStore::new();
        let before = now_millis();
        let report = store.create(observation(WaterLevel::Green)).await.unwrap();
        let after = now_millis();

        assert!(Uuid::parse_str(&report.id).is_ok());
        assert_eq!((report.confirms, report.rejects), (0, 0));
        assert!(report.created_at >= before && report.created_at <= after);
    }

    #[tokio::test]
    async fn test_subscriber_sees_writes() {
        let store = MemoryReportStore::new();
        let mut sub = store.subscribe();
        assert!(sub.next().await.unwrap().is_empty());

        let report = store.create(observation(WaterLevel::Red)).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, report.id);

        store
            .increment_vote(&report.id, VoteChoice::Confirm)
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot[0].confirms, 1);
        assert_eq!(snapshot[0].rejects, 0);
    }

    #[tokio::test]
    async fn test_vote_unknown_id_is_none() {
        let store = MemoryReportStore::new();
        let result = store
            .increment_vote("does-not-exist", VoteChoice::Reject)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_newest_first() {
        let store = MemoryReportStore::new();
        for (id, created_at) in [("old", 10), ("new", 30), ("mid", 20)] {
            store
                .insert_raw(RawReport {
                    id: id.to_string(),
                    latitude: 18.5,
                    longitude: -69.9,
                    water_level: WaterLevel::Yellow,
                    recommended_vehicles: vec![VehicleType::Motor],
                    comment: None,
                    photo_url: None,
                    created_at: Some(created_at),
                    confirms: 0,
                    rejects: 0,
                })
                .await;
        }
        let mut sub = store.subscribe();
        let ids: Vec<_> = sub
            .next()
            .await
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }
}
