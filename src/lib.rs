use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod store;

use registry::Registry;
use resolver::Resolver;
use store::{LinkStore, SharedStore};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    pub registry: Registry,
    pub resolver: Resolver,
}

impl AppState {
    /// The Registry and Resolver share one store and one write lock.
    pub fn new(config: config::AppConfig, store: Arc<dyn LinkStore>) -> Self {
        let links = SharedStore::new(store);
        Self {
            config,
            registry: Registry::new(links.clone()),
            resolver: Resolver::new(links),
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .route(
            "/urls",
            get(handlers::urls::list)
                .post(handlers::urls::post)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/urls/:short_id",
            put(handlers::urls::edit)
                .delete(handlers::urls::remove)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/login",
            post(handlers::urls::login).fallback(handlers::method_not_allowed),
        )
        // Short-link redirect; static routes above take priority
        .route(
            "/:short_id",
            get(handlers::redirect::redirect).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
