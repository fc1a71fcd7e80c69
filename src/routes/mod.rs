pub mod auth;
pub mod dashboard;
pub mod movements;
pub mod products;
pub mod profile;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        // Products
        .route("/api/v1/products", get(products::list).post(products::create))
        .route(
            "/api/v1/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/v1/products/{id}/image", put(products::upload_image))
        .route("/api/v1/categories", get(products::categories))
        // Movements
        .route("/api/v1/movements", get(movements::list))
        .route("/api/v1/movements/entry", post(movements::create_entry))
        .route("/api/v1/movements/exit", post(movements::create_exit))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::summary))
        // Profile
        .route("/api/v1/profile", get(profile::get).put(profile::update))
}
