use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::Json,
};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;

use crate::app::state::AppState;
use crate::models::overlay::Session;

/// Cookie set by the sign-in flow once the identity provider accepts the user.
pub const AUTH_COOKIE: &str = "authenticated";

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(session_from_headers(&parts.headers, &state.config.token))
    }
}

pub fn session_from_headers(headers: &HeaderMap, token: &str) -> Session {
    let has_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, _)| name == AUTH_COOKIE);

    let has_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|bearer| !token.is_empty() && bearer == token);

    Session {
        authenticated: has_cookie || has_token,
    }
}

pub async fn check(session: Session) -> (StatusCode, Json<Value>) {
    let status = if session.authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (
        status,
        Json(serde_json::json!({ "authenticated": session.authenticated })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::Config;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_or_token_authenticates() {
        let mut headers = HeaderMap::new();
        assert!(!session_from_headers(&headers, "secret").authenticated);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; authenticated=true"));
        assert!(session_from_headers(&headers, "secret").authenticated);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        assert!(session_from_headers(&headers, "secret").authenticated);
        assert!(!session_from_headers(&headers, "other").authenticated);
    }

    #[test]
    fn test_default_config_has_no_token() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 123"));
        assert!(!session_from_headers(&headers, &config.token).authenticated);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(!session_from_headers(&headers, &config.token).authenticated);
    }
}
