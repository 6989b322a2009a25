use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

pub mod redirect;
pub mod urls;

/// GET /
/// Redirect to ROOT_REDIRECT_URL when configured, otherwise name the service.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    match &state.config.root_redirect_url {
        Some(url) => Redirect::to(url).into_response(),
        None => "shortly".into_response(),
    }
}

/// Any method a route does not serve.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Any path no route matches.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Public origin for building short URLs: BASE_URL if configured, else the
/// request's Host header (plain http for local hosts), else localhost.
pub(crate) fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.base_url {
        return base.clone();
    }

    match headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
    {
        Some(host) if host.starts_with("localhost") || host.starts_with("127.0.0.1") => {
            format!("http://{host}")
        }
        Some(host) => format!("https://{host}"),
        None => state.config.fallback_origin(),
    }
}
