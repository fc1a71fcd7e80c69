pub mod auth;
pub mod dashboard;
pub mod movements;
pub mod products;
pub mod profile;

use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;

use crate::auth::extractor::AuthUser;
use crate::models::{round_price, Profile, Role};
use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        // Auth views
        .route("/", get(auth::login_page))
        .route("/auth/login", get(auth::login_page).post(auth::login_submit))
        .route("/auth/logout", post(auth::logout))
        // Dashboard
        .route("/dashboard", get(dashboard::index))
        // Products
        .route("/products", get(products::list))
        .route("/products/new", get(products::new_page).post(products::create))
        .route(
            "/products/{id}/edit",
            get(products::edit_page).post(products::update),
        )
        .route("/products/{id}/delete", post(products::delete))
        // Movements
        .route("/entries", get(movements::entry_page).post(movements::entry_submit))
        .route("/exits", get(movements::exit_page).post(movements::exit_submit))
        .route("/history", get(movements::history))
        // Profile
        .route("/profile", get(profile::show).post(profile::save))
}

/// Header data shared by every signed-in page.
pub struct Nav {
    pub user_name: String,
    pub role_label: String,
    pub can_edit: bool,
}

impl Nav {
    pub fn new(auth: &AuthUser, profile: Option<&Profile>) -> Self {
        let role = profile.and_then(Profile::role);
        Nav {
            user_name: profile
                .map(|p| p.name.clone())
                .unwrap_or_else(|| auth.email.clone()),
            role_label: role_label(role).to_string(),
            can_edit: matches!(role, Some(Role::Admin | Role::Employee)),
        }
    }
}

pub fn role_label(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "Administrator",
        Some(Role::Employee) => "Employee",
        Some(Role::Auditor) => "Auditor",
        None => "No role",
    }
}

pub fn money(value: Decimal) -> String {
    format!("{:.2}", round_price(value))
}
