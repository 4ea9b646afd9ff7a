use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::state::AppState;
use crate::error::{OverlayError, Result};
use crate::models::overlay::{NewOverlay, OverlayRecord, Session};
use crate::services::payment_target;
use crate::services::renderer::OverlayFrame;

#[derive(Debug, Deserialize)]
struct CreateOverlay {
    #[serde(flatten)]
    fields: NewOverlay,
    #[serde(default = "default_activate")]
    activate: bool,
}

fn default_activate() -> bool {
    true
}

/// A record as the control surface sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    #[serde(flatten)]
    pub record: OverlayRecord,
    pub payment_target: String,
    pub overlay_url: String,
}

impl OverlayView {
    fn new(state: &AppState, record: OverlayRecord) -> Self {
        let payment_target =
            payment_target::resolve_method(record.payment_method, &record.payment_identifier);
        let overlay_url = state.service.share_url(&record).to_string();
        Self {
            record,
            payment_target,
            overlay_url,
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<OverlayView>)> {
    let request: CreateOverlay = serde_json::from_value(payload).map_err(|e| {
        warn!("Invalid overlay request: {}", e);
        OverlayError::Validation(e.to_string())
    })?;

    let record = state
        .service
        .create(session, request.fields, request.activate)?;
    info!("Overlay {} ready at {}", record.id, state.service.share_url(&record));

    Ok((StatusCode::CREATED, Json(OverlayView::new(&state, record))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<OverlayView>>> {
    let views = state
        .service
        .list(session)?
        .into_iter()
        .map(|record| OverlayView::new(&state, record))
        .collect();
    Ok(Json(views))
}

pub async fn active_frame(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<OverlayFrame>> {
    Ok(Json(state.service.live_frame(session)?))
}

pub async fn activate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<OverlayView>> {
    let record = state.service.activate(session, id)?;
    Ok(Json(OverlayView::new(&state, record)))
}

pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<OverlayView>> {
    let record = state.service.deactivate(session, id)?;
    Ok(Json(OverlayView::new(&state, record)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service.delete(session, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent stream of store events; `expired` is the one surfaces wait for.
pub async fn events(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let receiver = state.service.subscribe(session)?;

    let stream = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), receiver)),
                    Err(e) => warn!("Failed to encode overlay event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{config::Config, router};
    use crate::services::overlay_service::tests::{fields, service};
    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let config = Config {
            token: "secret".into(),
            ..Config::default()
        };
        let state = Arc::new(AppState::new(Arc::new(service()), config));
        (router::build(state.clone()), state)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer secret");
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn maria() -> Value {
        serde_json::json!({
            "recipientName": "Maria",
            "paymentMethod": "paypal",
            "paymentIdentifier": "jdoe",
            "durationMinutes": 5
        })
    }

    #[tokio::test]
    async fn test_create_returns_overlay_and_share_url() {
        let (app, _) = app();
        let response = app
            .oneshot(request("POST", "/overlays", Some(maria())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json(response).await;
        assert_eq!(body["description"], "Help Maria");
        assert_eq!(body["active"], true);
        assert_eq!(body["remainingSeconds"], 300);
        assert_eq!(body["paymentTarget"], "https://paypal.me/jdoe");
        assert!(body["overlayUrl"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:3000/overlay?type=paypal&details=jdoe"));
    }

    #[tokio::test]
    async fn test_validation_errors_are_422() {
        let (app, state) = app();
        let mut too_long = maria();
        too_long["durationMinutes"] = 16.into();
        let response = app
            .clone()
            .oneshot(request("POST", "/overlays", Some(too_long)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(request(
                "POST",
                "/overlays",
                Some(serde_json::json!({ "paymentMethod": "pix" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.service.metrics().created, 0);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let (app, _) = app();
        let anonymous = Request::builder()
            .method("POST")
            .uri("/overlays")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(maria().to_string()))
            .unwrap();

        let response = app.clone().oneshot(anonymous).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let check = Request::builder()
            .uri("/api/auth/check")
            .header(header::COOKIE, "authenticated=true")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(check).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["authenticated"], true);
    }

    #[tokio::test]
    async fn test_lifecycle_over_http() {
        let (app, state) = app();
        let created = json(
            app.clone()
                .oneshot(request("POST", "/overlays", Some(maria())))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request("POST", &format!("/overlays/{id}/deactivate"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!state.service.has_active());

        let frame = json(
            app.clone()
                .oneshot(request("GET", "/overlays/active", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(frame["expired"], true);

        let response = app
            .clone()
            .oneshot(request("POST", &format!("/overlays/{id}/activate"), None))
            .await
            .unwrap();
        assert_eq!(json(response).await["active"], true);

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/overlays/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/overlays/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let list = json(app.oneshot(request("GET", "/overlays", None)).await.unwrap()).await;
        assert_eq!(list, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_event_stream_reports_expiry() {
        let (app, state) = app();
        state
            .service
            .create(Session::authenticated(), fields(1), true)
            .unwrap();

        let response = app
            .oneshot(request("GET", "/overlays/events", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        for _ in 0..60 {
            state.service.tick();
        }

        let mut body = response.into_body();
        let mut received = String::new();
        while !received.contains("event: expired") {
            let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
                .await
                .expect("no event before timeout")
                .expect("stream ended")
                .unwrap();
            if let Ok(data) = frame.into_data() {
                received.push_str(&String::from_utf8_lossy(&data));
            }
        }
        assert!(!state.service.has_active());
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _) = app();
        app.clone()
            .oneshot(request("POST", "/overlays", Some(maria())))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["overlays"]["created"], 1);
        assert_eq!(body["overlays"]["activated"], 1);
        assert_eq!(body["overlays"]["expired"], 0);
        assert_eq!(body["active"], true);
    }
}
