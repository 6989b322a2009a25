use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{self, header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt; // for `collect`
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use shortly::{
    config::AppConfig,
    models::ShortenedLink,
    store::{FileStore, LinkStore, MemoryStore, StoreError},
    AppState,
};

/// Every write fails, as on a read-only volume.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl LinkStore for ReadOnlyStore {
    async fn load(&self) -> Result<Vec<ShortenedLink>, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, _links: &[ShortenedLink]) -> Result<(), StoreError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume").into())
    }
}

fn app_with(store: Arc<dyn LinkStore>) -> Router {
    let config = AppConfig {
        base_url: Some("https://sho.rt".into()),
        ..AppConfig::default()
    };
    shortly::app(Arc::new(AppState::new(config, store)))
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::new()))
}

fn json_request(method: http::Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create(app: &Router, body: Value) -> Vec<ShortenedLink> {
    let response = app
        .clone()
        .oneshot(json_request(http::Method::POST, "/urls", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_value(body_json(response).await).unwrap()
}

#[tokio::test]
async fn list_starts_empty() {
    let response = app().oneshot(get("/urls")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn create_returns_updated_collection() {
    let app = app();
    let links = create(&app, json!({ "originalUrl": "https://example.com" })).await;

    assert_eq!(links.len(), 1);
    let link = &links[0];
    assert_eq!(link.short_id.len(), 8);
    assert_eq!(link.total_clicks, 0);
    assert_eq!(link.short_url, format!("https://sho.rt/{}", link.short_id));
}

#[tokio::test]
async fn create_without_url_is_bad_request() {
    let response = app()
        .oneshot(json_request(http::Method::POST, "/urls", json!({ "customId": "x" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(http::Method::POST)
                .uri("/urls")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_custom_id_is_conflict() {
    let app = app();
    create(&app, json!({ "originalUrl": "https://a.example", "customId": "promo1" })).await;

    let response = app
        .clone()
        .oneshot(json_request(
            http::Method::POST,
            "/urls",
            json!({ "originalUrl": "https://b.example", "customId": "promo1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let all = body_json(app.oneshot(get("/urls")).await.unwrap()).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["originalUrl"], "https://a.example");
}

#[tokio::test]
async fn redirect_counts_clicks() {
    let app = app();
    create(&app, json!({ "originalUrl": "https://example.com", "customId": "go" })).await;

    for _ in 0..3 {
        let response = app.clone().oneshot(get("/go")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com");
    }

    let all = body_json(app.oneshot(get("/urls")).await.unwrap()).await;
    assert_eq!(all[0]["totalClicks"], 3);
    assert!(all[0]["lastClickedAt"].is_i64());
}

#[tokio::test]
async fn redirect_adds_missing_scheme() {
    let app = app();
    create(&app, json!({ "originalUrl": "example.com/page", "customId": "bare" })).await;

    let response = app.oneshot(get("/bare")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://example.com/page");
}

#[tokio::test]
async fn unknown_id_is_404_json() {
    let response = app().oneshot(get("/nothere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "URL not found" }));
}

#[tokio::test]
async fn bulk_post_replaces_collection() {
    let app = app();
    create(&app, json!({ "originalUrl": "https://old.example" })).await;

    let replacement = json!([{
        "originalUrl": "https://new.example",
        "shortId": "fresh",
        "shortUrl": "https://sho.rt/fresh",
        "createdAt": 1700000000000_i64,
        "totalClicks": 7
    }]);
    let links = create(&app, replacement).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].short_id, "fresh");
    assert_eq!(links[0].total_clicks, 7);
}

#[tokio::test]
async fn edit_and_delete_are_guarded_by_credentials() {
    let app = app();
    create(
        &app,
        json!({
            "originalUrl": "https://example.com",
            "customId": "mine",
            "username": "ann",
            "password": "pw"
        }),
    )
    .await;

    let wrong = app
        .clone()
        .oneshot(json_request(
            http::Method::PUT,
            "/urls/mine",
            json!({ "username": "ann", "password": "nope", "newShortId": "yours" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let renamed = app
        .clone()
        .oneshot(json_request(
            http::Method::PUT,
            "/urls/mine",
            json!({ "username": "ann", "password": "pw", "newShortId": "ours" }),
        ))
        .await
        .unwrap();
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = body_json(renamed).await;
    assert_eq!(body["shortId"], "ours");
    assert_eq!(body["shortUrl"], "https://sho.rt/ours");

    let deleted = app
        .clone()
        .oneshot(json_request(
            http::Method::DELETE,
            "/urls/ours",
            json!({ "username": "ann", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await, json!([]));

    let gone = app.oneshot(get("/ours")).await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_lists_owned_links() {
    let app = app();
    create(
        &app,
        json!({ "originalUrl": "https://a.example", "username": "ann", "password": "pw" }),
    )
    .await;
    create(&app, json!({ "originalUrl": "https://b.example" })).await;

    let ok = app
        .clone()
        .oneshot(json_request(
            http::Method::POST,
            "/login",
            json!({ "username": "ann", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let owned = body_json(ok).await;
    assert_eq!(owned.as_array().unwrap().len(), 1);
    assert_eq!(owned[0]["originalUrl"], "https://a.example");

    let denied = app
        .oneshot(json_request(
            http::Method::POST,
            "/login",
            json!({ "username": "ann", "password": "bad" }),
        ))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(http::Method::PATCH)
                .uri("/urls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await, json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn responses_carry_cors_header() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/urls")
                .header(header::ORIGIN, "https://app.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn preflight_is_empty_200() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(http::Method::OPTIONS)
                .uri("/urls")
                .header(header::ORIGIN, "https://app.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn health_and_index() {
    let app = app();
    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let index = app.oneshot(get("/")).await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
}

#[tokio::test]
async fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urls.json");

    let first = app_with(Arc::new(FileStore::new(&path)));
    create(&first, json!({ "originalUrl": "https://example.com", "customId": "keep" })).await;
    let response = first.oneshot(get("/keep")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let second = app_with(Arc::new(FileStore::new(&path)));
    let all = body_json(second.oneshot(get("/urls")).await.unwrap()).await;
    assert_eq!(all[0]["shortId"], "keep");
    assert_eq!(all[0]["totalClicks"], 1);
}

#[tokio::test]
async fn url_with_newline_is_rejected_before_storing() {
    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            http::Method::POST,
            "/urls",
            json!({ "originalUrl": "https://e.com/a\nb", "customId": "nl" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = app.clone().oneshot(get("/nl")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(app.oneshot(get("/urls")).await.unwrap()).await, json!([]));
}

#[tokio::test]
async fn failed_save_is_500_with_details() {
    let app = app_with(Arc::new(ReadOnlyStore::default()));
    let response = app
        .clone()
        .oneshot(json_request(
            http::Method::POST,
            "/urls",
            json!({ "originalUrl": "https://example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("read-only volume"));

    let all = body_json(app.oneshot(get("/urls")).await.unwrap()).await;
    assert_eq!(all, json!([]));
}
