use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("overlay {0} not found")]
    NotFound(Uuid),
    #[error("authentication required")]
    Unauthorized,
}

impl OverlayError {
    pub fn status(&self) -> StatusCode {
        match self {
            OverlayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OverlayError::NotFound(_) => StatusCode::NOT_FOUND,
            OverlayError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for OverlayError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
