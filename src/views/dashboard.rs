use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::inventory::dashboard;
use crate::state::SharedState;
use crate::views::{money, Nav};

#[derive(Template)]
#[template(path = "dashboard/index.html")]
#[allow(dead_code)]
struct DashboardTemplate {
    nav: Nav,
    total_products: i64,
    low_stock_count: usize,
    inventory_value: String,
    recent: Vec<RecentMovement>,
}

#[allow(dead_code)]
struct RecentMovement {
    product: String,
    is_entry: bool,
    quantity: String,
    date: String,
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;
    let data = dashboard::load(&state.pool, state.config.dashboard_sample_limit).await?;

    let recent = data
        .recent_movements
        .iter()
        .map(|m| RecentMovement {
            product: m.product_label().to_string(),
            is_entry: m.is_entry(),
            quantity: format!("{}{}", m.sign(), m.quantity),
            date: m.date.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let template = DashboardTemplate {
        nav: Nav::new(&auth, profile.as_ref()),
        total_products: data.total_products,
        low_stock_count: data.summary.low_stock_count,
        inventory_value: money(data.summary.inventory_value),
        recent,
    };
    Ok(Html(template.render().unwrap_or_default()))
}
