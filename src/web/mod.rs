pub mod catalog;
pub mod device;
pub mod error;
pub mod home;
pub mod profile;
pub mod reports;
pub mod views;

use crate::state::SharedState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "store": state.store.backend(),
        "subscriptions": state.store.subscriber_count(),
    }))
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/catalog", catalog::router())
        .nest("/home", home::router(state.clone()))
        .nest("/profile", profile::router(state.clone()))
        .nest("/reports", reports::router(state))
}
