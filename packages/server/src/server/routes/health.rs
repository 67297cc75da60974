use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    snapshot_store: String,
}

/// Liveness only; upstream platforms are not probed.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        snapshot_store: state.deps.snapshots.backend().to_string(),
    })
}
