use crate::{
    error::AppError,
    handlers::request_origin,
    models::{Credentials, EditLink, ShortenedLink, UrlsPayload},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

/// GET /urls
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShortenedLink>>, AppError> {
    Ok(Json(state.registry.list_all().await?))
}

/// POST /urls
///
/// A JSON array replaces the whole collection; a single object creates one
/// link. Either way the response is the updated collection.
pub async fn post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<UrlsPayload>, JsonRejection>,
) -> Result<Json<Vec<ShortenedLink>>, AppError> {
    let Json(payload) = payload.map_err(bad_body)?;

    let links = match payload {
        UrlsPayload::Replace(records) => state.registry.replace_all(records).await?,
        UrlsPayload::Create(new) => {
            let origin = request_origin(&state, &headers);
            let (_, links) = state.registry.create_listed(&origin, new).await?;
            links
        }
    };

    Ok(Json(links))
}

/// PUT /urls/:short_id
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(short_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<EditLink>, JsonRejection>,
) -> Result<Json<ShortenedLink>, AppError> {
    let Json(form) = payload.map_err(bad_body)?;
    let origin = request_origin(&state, &headers);

    let link = state
        .registry
        .edit(
            &origin,
            &short_id,
            &form.username,
            &form.password,
            form.new_short_id.as_deref(),
        )
        .await?;

    Ok(Json(link))
}

/// DELETE /urls/:short_id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(short_id): Path<String>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Vec<ShortenedLink>>, AppError> {
    let Json(creds) = payload.map_err(bad_body)?;

    let remaining = state
        .registry
        .remove(&short_id, &creds.username, &creds.password)
        .await?;

    Ok(Json(remaining))
}

/// POST /login
/// Returns the links created with the given username/password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Vec<ShortenedLink>>, AppError> {
    let Json(creds) = payload.map_err(bad_body)?;
    let links = state
        .registry
        .list_owned(&creds.username, &creds.password)
        .await?;
    Ok(Json(links))
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}
