use crate::domain::models::{Settings, VehicleType};
use crate::domain::session::SessionAction;
use crate::state::SharedState;
use crate::time_utils::now_millis;
use crate::web::device::DeviceId;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    pub vehicle_type: VehicleType,
    pub label: &'static str,
    pub tip: String,
}

impl From<VehicleType> for VehicleProfile {
    fn from(vehicle_type: VehicleType) -> Self {
        Self {
            vehicle_type,
            label: vehicle_type.label(),
            tip: format!(
                "Recomendaciones personalizadas activas para: {}",
                vehicle_type.label()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub dark_mode: bool,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/vehicle", get(get_vehicle).put(set_vehicle))
        .route("/settings", get(get_settings).put(set_settings))
        .with_state(state)
}

async fn get_vehicle(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
) -> Json<VehicleProfile> {
    let session = state.session(&device, now_millis()).await;
    Json(VehicleProfile::from(session.vehicle))
}

async fn set_vehicle(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
    Json(payload): Json<VehiclePayload>,
) -> Json<VehicleProfile> {
    let (session, _) = state
        .dispatch(
            &device,
            now_millis(),
            &[SessionAction::SelectVehicle(payload.vehicle_type)],
        )
        .await;
    tracing::debug!(device = %device, vehicle = session.vehicle.as_str(), "vehicle selected");
    Json(VehicleProfile::from(session.vehicle))
}

async fn get_settings(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
) -> Json<Settings> {
    Json(state.session(&device, now_millis()).await.settings)
}

/// Only dark mode is user-editable; the rain flag follows the weather.
async fn set_settings(
    DeviceId(device): DeviceId,
    State(state): State<SharedState>,
    Json(payload): Json<SettingsPayload>,
) -> Json<Settings> {
    let (session, _) = state
        .dispatch(
            &device,
            now_millis(),
            &[SessionAction::SetDarkMode(payload.dark_mode)],
        )
        .await;
    Json(session.settings)
}
