use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:short_id
///
/// Resolve the id (which records the click) and answer 302 Found with the
/// target in `Location`. Unknown ids get a 404 JSON body.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(short_id): Path<String>,
) -> Result<Response, AppError> {
    let original_url = state.resolver.resolve(&short_id).await?;
    let target = location(&original_url)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
}

/// Header value for the redirect. Create and bulk replace refuse URLs that
/// cannot be one; this catches anything that reached the store another way.
fn location(original_url: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::try_from(with_scheme(original_url)).map_err(|_| {
        tracing::warn!("Stored URL is not a valid Location header: {:?}", original_url);
        AppError::Validation("Stored URL cannot be used as a redirect target".into())
    })
}

/// Stored URLs are kept as entered; a bare host like "example.com" is sent
/// as "https://example.com".
fn with_scheme(url: &str) -> String {
    if url.starts_with("http") {
        url.to_owned()
    } else {
        format!("https://{url}")
    }
}
