use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::app::state::AppState;
use crate::handlers::{auth, metrics, overlay_page, overlays};

pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/check", get(auth::check))
        .route("/overlays", get(overlays::list).post(overlays::create))
        .route("/overlays/active", get(overlays::active_frame))
        .route("/overlays/events", get(overlays::events))
        .route("/overlays/:id", axum::routing::delete(overlays::delete))
        .route("/overlays/:id/activate", post(overlays::activate))
        .route("/overlays/:id/deactivate", post(overlays::deactivate))
        .route("/overlay", get(overlay_page::page))
        .route("/overlay/frame", get(overlay_page::frame))
        .route("/metrics", get(metrics::get_metrics))
        .with_state(state)
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}
