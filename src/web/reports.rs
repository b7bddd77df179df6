use crate::domain::geo::{valid_coordinates, Notice};
use crate::domain::lifecycle::ReportSet;
use crate::domain::models::{Observation, VehicleType, VoteChoice, WaterLevel};
use crate::state::SharedState;
use crate::time_utils::now_millis;
use crate::web::device::DeviceId;
use crate::web::error::ApiError;
use crate::web::views::ReportView;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub water_level: Option<WaterLevel>,
    #[serde(default)]
    pub recommended_vehicles: Vec<VehicleType>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CreateReportPayload {
    /// Checks the form and normalises it: duplicate vehicles collapse, the
    /// comment is trimmed and dropped when blank.
    pub fn into_observation(self) -> Result<Observation, ApiError> {
        if !valid_coordinates(self.latitude, self.longitude) {
            return Err(ApiError::InvalidLocation);
        }

        let mut vehicles: Vec<VehicleType> = Vec::with_capacity(self.recommended_vehicles.len());
        for vehicle in self.recommended_vehicles {
            if !vehicles.contains(&vehicle) {
                vehicles.push(vehicle);
            }
        }
        if vehicles.is_empty() {
            return Err(ApiError::NoVehicles);
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(ApiError::CommentTooLong(MAX_COMMENT_CHARS));
        }

        Ok(Observation {
            latitude: self.latitude,
            longitude: self.longitude,
            water_level: self.water_level.unwrap_or(WaterLevel::Yellow),
            recommended_vehicles: vehicles,
            comment,
            photo_url: self.photo_url.filter(|p| !p.trim().is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedReport {
    pub report: ReportView,
    pub notice: Notice,
}

#[derive(Debug, Deserialize)]
pub struct VotePayload {
    pub choice: VoteChoice,
}

#[derive(Debug, Serialize)]
pub struct VoteOutcome {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportView>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list_reports))
        .route("/", post(create_report))
        .route("/stream", get(stream_reports))
        .route("/:id/vote", post(vote))
        .with_state(state)
}

pub fn active_views(set: &ReportSet, now_ms: i64) -> Vec<ReportView> {
    set.prune(now_ms)
        .newest_first()
        .into_iter()
        .map(ReportView::from)
        .collect()
}

async fn list_reports(State(state): State<SharedState>) -> Json<Vec<ReportView>> {
    let set = state.board.current().await;
    Json(active_views(&set, now_millis()))
}

async fn create_report(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<(StatusCode, Json<CreatedReport>), ApiError> {
    let observation = payload.into_observation()?;
    if !state.report_limiter.check(&device).await {
        tracing::warn!("Report rate limit exceeded for device: {}", device);
        return Err(ApiError::RateLimited);
    }

    let report = state
        .store
        .create(observation)
        .await
        .map_err(ApiError::CreateFailed)?;
    state.board.add(report.clone()).await;

    Ok((
        StatusCode::CREATED,
        Json(CreatedReport {
            report: ReportView::from(report),
            notice: Notice::new("Reporte enviado", "Gracias por ayudar a la comunidad vial."),
        }),
    ))
}

async fn vote(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<VotePayload>,
) -> Result<Json<VoteOutcome>, ApiError> {
    // Only reports still on the board can be voted on; anything else already
    // expired or vanished and is ignored.
    let active = state.board.current().await.prune(now_millis());
    if active.get(&id).is_none() {
        tracing::debug!(report_id = %id, "vote on inactive report ignored");
        return Ok(Json(VoteOutcome {
            applied: false,
            report: None,
        }));
    }

    let updated = state
        .store
        .increment_vote(&id, payload.choice)
        .await
        .map_err(ApiError::VoteFailed)?;

    let Some(updated) = updated else {
        return Ok(Json(VoteOutcome {
            applied: false,
            report: None,
        }));
    };
    state.board.vote(&updated, payload.choice).await;

    Ok(Json(VoteOutcome {
        applied: true,
        report: Some(ReportView::from(updated)),
    }))
}

/// One `reports` event per store snapshot, holding the active reports newest
/// first. The store subscription lives exactly as long as the connection.
async fn stream_reports(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.store.subscribe();
    tracing::info!(subscription = subscription.id(), device = %device, "report stream opened");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.next().await?;
        let now = now_millis();
        let set = ReportSet::new().ingest(&snapshot, now);
        let event = Event::default()
            .event("reports")
            .json_data(active_views(&set, now));
        Some((event, subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(vehicles: Vec<VehicleType>, comment: Option<&str>) -> CreateReportPayload {
        CreateReportPayload {
            latitude: 18.48,
            longitude: -69.93,
            water_level: Some(WaterLevel::Green),
            recommended_vehicles: vehicles,
            comment: comment.map(str::to_string),
            photo_url: None,
        }
    }

    #[test]
    fn test_empty_vehicle_list_rejected() {
        let err = payload(vec![], None).into_observation().unwrap_err();
        assert!(matches!(err, ApiError::NoVehicles));
    }

    #[test]
    fn test_normalises_vehicles_and_comment() {
        let observation = payload(
            vec![VehicleType::Jeepeta, VehicleType::Camion, VehicleType::Jeepeta],
            Some("   "),
        )
        .into_observation()
        .unwrap();
        assert_eq!(
            observation.recommended_vehicles,
            vec![VehicleType::Jeepeta, VehicleType::Camion]
        );
        assert!(observation.comment.is_none());

        let observation = payload(vec![VehicleType::Motor], Some("  carril libre "))
            .into_observation()
            .unwrap();
        assert_eq!(observation.comment.as_deref(), Some("carril libre"));
    }

    #[test]
    fn test_missing_level_defaults_to_yellow() {
        let mut p = payload(vec![VehicleType::Jeepeta], None);
        p.water_level = None;
        assert_eq!(p.into_observation().unwrap().water_level, WaterLevel::Yellow);
    }

    #[test]
    fn test_long_comment_and_bad_coordinates() {
        let long = "a".repeat(MAX_COMMENT_CHARS + 1);
        let err = payload(vec![VehicleType::Motor], Some(long.as_str()))
            .into_observation()
            .unwrap_err();
        assert!(matches!(err, ApiError::CommentTooLong(_)));

        let mut p = payload(vec![VehicleType::Motor], None);
        p.latitude = 200.0;
        assert!(matches!(p.into_observation(), Err(ApiError::InvalidLocation)));
    }
}
