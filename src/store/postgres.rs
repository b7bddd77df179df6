use crate::domain::models::{
    FloodReport, Observation, RawReport, VehicleType, VoteChoice, WaterLevel,
};
use crate::store::{ReportStore, SnapshotFeed, StoreError, Subscription};
use crate::time_utils::now_millis;
use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Channel the table trigger notifies on every insert or update.
pub const NOTIFY_CHANNEL: &str = "flood_reports";

const REPORT_COLUMNS: &str = r#"
    id,
    latitude,
    longitude,
    water_level,
    recommended_vehicles,
    comment,
    photo_url,
    created_at,
    confirms,
    rejects
"#;

#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    latitude: f64,
    longitude: f64,
    water_level: String,
    recommended_vehicles: Vec<String>,
    comment: Option<String>,
    photo_url: Option<String>,
    created_at: Option<i64>,
    confirms: i32,
    rejects: i32,
}

impl ReportRow {
    /// `None` for rows whose water level cannot be read; unknown vehicle
    /// names are dropped.
    fn into_raw(self) -> Option<RawReport> {
        let Ok(water_level) = WaterLevel::try_from(self.water_level.as_str()) else {
            tracing::warn!(
                report_id = %self.id,
                water_level = %self.water_level,
                "skipping report with unknown water level"
            );
            return None;
        };

        let recommended_vehicles = self
            .recommended_vehicles
            .iter()
            .filter_map(|v| VehicleType::try_from(v.as_str()).ok())
            .collect();

        Some(RawReport {
            id: self.id.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            water_level,
            recommended_vehicles,
            comment: self.comment,
            photo_url: self.photo_url,
            created_at: self.created_at,
            confirms: self.confirms.max(0) as u32,
            rejects: self.rejects.max(0) as u32,
        })
    }
}

pub struct PgReportStore {
    pool: PgPool,
    feed: SnapshotFeed,
}

impl PgReportStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Arc<Self>, StoreError> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Arc::new(Self {
            pool,
            feed: SnapshotFeed::new(),
        });
        let loaded = store.refresh().await?;
        tracing::info!(reports = loaded, "Report store ready");
        Ok(store)
    }

    /// Reloads the whole collection and pushes it to subscribers.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM flood_reports ORDER BY created_at DESC NULLS FIRST"
        ))
        .fetch_all(&self.pool)
        .await?;

        let docs: Vec<RawReport> = rows.into_iter().filter_map(ReportRow::into_raw).collect();
        let count = docs.len();
        self.feed.publish(docs);
        Ok(count)
    }

    /// Follows `NOTIFY` from other writers so every instance's feed stays
    /// current.
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut listener = match PgListener::connect_with(&store.pool).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!("Failed to open report listener: {}", e);
                    return;
                }
            };
            if let Err(e) = listener.listen(NOTIFY_CHANNEL).await {
                tracing::error!("Failed to LISTEN on {}: {}", NOTIFY_CHANNEL, e);
                return;
            }
            tracing::info!("Listening for report changes on {}", NOTIFY_CHANNEL);

            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        tracing::debug!(report_id = notification.payload(), "report changed");
                        if let Err(e) = store.refresh().await {
                            tracing::warn!("Failed to refresh reports after notify: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Report listener error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        })
    }

    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Write succeeded but refresh failed: {}", e);
        }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create(&self, observation: Observation) -> Result<FloodReport, StoreError> {
        let vehicles: Vec<String> = observation
            .recommended_vehicles
            .iter()
            .map(|v| v.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            INSERT INTO flood_reports
                (id, latitude, longitude, water_level, recommended_vehicles, comment, photo_url, created_at, confirms, rejects)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(observation.latitude)
        .bind(observation.longitude)
        .bind(observation.water_level.as_str())
        .bind(&vehicles)
        .bind(&observation.comment)
        .bind(&observation.photo_url)
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await?;

        let report = row
            .into_raw()
            .map(|doc| doc.into_report(now_millis()))
            .ok_or_else(|| StoreError::Unavailable("inserted row could not be read back".into()))?;
        tracing::info!(report_id = %report.id, level = report.water_level.as_str(), "report created");

        self.refresh_after_write().await;
        Ok(report)
    }

    async fn increment_vote(
        &self,
        id: &str,
        choice: VoteChoice,
    ) -> Result<Option<FloodReport>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let column = match choice {
            VoteChoice::Confirm => "confirms",
            VoteChoice::Reject => "rejects",
        };
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "UPDATE flood_reports SET {column} = {column} + 1 WHERE id = $1 RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        self.refresh_after_write().await;
        Ok(row.into_raw().map(|doc| doc.into_report(now_millis())))
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: &str, vehicles: &[&str]) -> ReportRow {
        ReportRow {
            id: Uuid::new_v4(),
            latitude: 18.5,
            longitude: -69.9,
            water_level: level.to_string(),
            recommended_vehicles: vehicles.iter().map(|v| v.to_string()).collect(),
            comment: None,
            photo_url: None,
            created_at: None,
            confirms: 3,
            rejects: -1,
        }
    }

    #[test]
    fn test_row_conversion_filters_unknown_vehicles() {
        let raw = row("red", &["motor", "bicicleta", "camion"]).into_raw().unwrap();
        assert_eq!(raw.water_level, WaterLevel::Red);
        assert_eq!(
            raw.recommended_vehicles,
            vec![VehicleType::Motor, VehicleType::Camion]
        );
        assert_eq!(raw.confirms, 3);
        assert_eq!(raw.rejects, 0);
        assert!(raw.created_at.is_none());
    }

    #[test]
    fn test_row_with_unknown_level_is_skipped() {
        assert!(row("brown", &["motor"]).into_raw().is_none());
    }
}
