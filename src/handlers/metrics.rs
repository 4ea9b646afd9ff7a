use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::app::state::AppState;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let metrics = state.service.metrics();
    let active = state.service.has_active();

    Json(serde_json::json!({
        "overlays": metrics,
        "active": active,
    }))
}
