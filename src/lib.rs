pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod inventory;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod storage;
pub mod views;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StorageBackend};
use crate::middleware::auth_redirect::redirect_unauthorized;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};
use crate::storage::BlobStore;

pub fn build_app(pool: PgPool, config: Config) -> Router {
    let storage = storage::from_config(&config.storage, &config.base_url);
    build_app_with_storage(pool, config, storage)
}

/// Same as [`build_app`] with an explicit blob store.
pub fn build_app_with_storage(
    pool: PgPool,
    config: Config,
    storage: Arc<dyn BlobStore>,
) -> Router {
    let max_upload_size = config.max_upload_size;
    let media_dir = match &config.storage.backend {
        StorageBackend::Local { dir } => Some(dir.clone()),
        StorageBackend::Remote { .. } => None,
    };

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        storage,
        login_limiter: LoginRateLimiter::new(),
    });

    let mut app = Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes().layer(axum::middleware::from_fn(redirect_unauthorized)))
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health));

    if let Some(dir) = media_dir {
        app = app.nest_service("/media", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
