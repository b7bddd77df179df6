use crate::domain::advisory::vehicle_advisory;
use crate::domain::alerting::FloodAlert;
use crate::domain::geo::{resolve_region, MapRegion, Notice};
use crate::domain::models::{VehicleType, WaterLevel};
use crate::domain::session::SessionAction;
use crate::services::weather::{weather_text, WEATHER_UNAVAILABLE};
use crate::state::SharedState;
use crate::time_utils::now_millis;
use crate::web::device::DeviceId;
use crate::web::views::{MapMarker, ReportCard, EMPTY_LIST_MESSAGE};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub region: MapRegion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_notice: Option<Notice>,
    pub weather_text: String,
    pub raining: bool,
    pub advisory: &'static str,
    pub vehicle: VehicleType,
    pub vehicle_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<FloodAlert>,
    pub markers: Vec<MapMarker>,
    pub reports: Vec<ReportCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    pub dark_mode: bool,
}

pub fn router(state: SharedState) -> Router {
    Router::new().route("/", get(home)).with_state(state)
}

/// Everything the map/list screen needs in one call. Opening the screen counts
/// as a resume, so expired reports are pruned first.
async fn home(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
    Query(query): Query<HomeQuery>,
) -> Json<HomeView> {
    let now = now_millis();
    let expired = state.board.prune(now).await;
    if expired > 0 {
        tracing::debug!(expired, "pruned expired reports on resume");
    }

    let (region, permission_notice) = resolve_region(query.lat.zip(query.lng));

    let mut actions = Vec::with_capacity(2);
    let weather_line = match state
        .weather
        .fetch_current(region.latitude, region.longitude)
        .await
    {
        Ok(current) => {
            let raining = current.map(|c| c.is_raining()).unwrap_or(false);
            actions.push(SessionAction::WeatherLoaded { raining });
            weather_text(current.as_ref())
        }
        Err(e) => {
            tracing::warn!("Weather lookup failed: {}", e);
            WEATHER_UNAVAILABLE.to_string()
        }
    };

    let active = state.board.current().await;
    actions.push(SessionAction::ReportsObserved {
        red_count: active.count_level(WaterLevel::Red),
    });
    let (session, alert) = state.dispatch(&device, now, &actions).await;
    if let Some(alert) = &alert {
        tracing::info!(device = %device, red_reports = alert.red_reports, "flood alert raised");
    }

    let reports = active.newest_first();
    Json(HomeView {
        region,
        permission_notice,
        weather_text: weather_line,
        raining: session.settings.raining_alert,
        advisory: vehicle_advisory(&reports, session.vehicle),
        vehicle: session.vehicle,
        vehicle_text: format!("Vehículo: {}", session.vehicle.label()),
        alert,
        markers: reports.iter().map(MapMarker::from).collect(),
        empty_message: active.is_empty().then_some(EMPTY_LIST_MESSAGE),
        reports: reports.iter().map(ReportCard::from).collect(),
        dark_mode: session.settings.dark_mode,
    })
}
