use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::gate::STOCK_EDITORS;
use crate::db;
use crate::db::movements::HistoryFilter;
use crate::error::AppError;
use crate::forms;
use crate::inventory::{self, MovementRequest};
use crate::models::MovementKind;
use crate::routes::movements::HistoryQuery;
use crate::state::SharedState;
use crate::views::Nav;

#[derive(Template)]
#[template(path = "movements/form.html")]
#[allow(dead_code)]
struct MovementFormTemplate {
    nav: Nav,
    title: String,
    action: String,
    submit_label: String,
    products: Vec<ProductOption>,
    quantity: String,
    reason: String,
    date: String,
    error: Option<String>,
}

#[allow(dead_code)]
struct ProductOption {
    id: String,
    name: String,
    stock: i32,
    selected: bool,
}

#[derive(Template)]
#[template(path = "movements/history.html")]
#[allow(dead_code)]
struct HistoryTemplate {
    nav: Nav,
    products: Vec<FilterOption>,
    responsibles: Vec<FilterOption>,
    kind: String,
    date_from: String,
    date_to: String,
    rows: Vec<HistoryRow>,
    error: Option<String>,
}

#[allow(dead_code)]
struct FilterOption {
    value: String,
    label: String,
    selected: bool,
}

#[allow(dead_code)]
struct HistoryRow {
    date: String,
    product: String,
    is_entry: bool,
    kind_label: String,
    quantity: String,
    reason: String,
    responsible: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub date: String,
}

impl MovementForm {
    fn to_request(&self) -> Result<MovementRequest, String> {
        Ok(MovementRequest {
            product_id: forms::parse_product_id(&self.product_id)?,
            quantity: forms::parse_quantity(&self.quantity)?,
            reason: self.reason.trim().to_string(),
            date: forms::parse_date(&self.date)?,
        })
    }
}

fn titles(kind: MovementKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        MovementKind::Entry => ("Stock entry", "/entries", "Register entry"),
        MovementKind::Exit => ("Stock exit", "/exits", "Register exit"),
    }
}

async fn render_form(
    pool: &PgPool,
    nav: Nav,
    kind: MovementKind,
    form: &MovementForm,
    error: Option<String>,
) -> Result<Response, AppError> {
    let selected = form.product_id.trim();
    let products = db::products::list(pool, &Default::default())
        .await?
        .into_iter()
        .map(|p| {
            let id = p.id.to_string();
            ProductOption {
                selected: id == selected,
                id,
                name: p.name,
                stock: p.stock,
            }
        })
        .collect();

    let (title, action, submit_label) = titles(kind);
    let date = if form.date.is_empty() {
        forms::today().format("%Y-%m-%d").to_string()
    } else {
        form.date.clone()
    };

    let template = MovementFormTemplate {
        nav,
        title: title.to_string(),
        action: action.to_string(),
        submit_label: submit_label.to_string(),
        products,
        quantity: form.quantity.clone(),
        reason: form.reason.clone(),
        date,
        error,
    };
    Ok(Html(template.render().unwrap_or_default()).into_response())
}

async fn movement_page(
    auth: AuthUser,
    state: SharedState,
    kind: MovementKind,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let nav = Nav::new(&auth, Some(&profile));
    render_form(&state.pool, nav, kind, &MovementForm::default(), None).await
}

async fn movement_submit(
    auth: AuthUser,
    state: SharedState,
    kind: MovementKind,
    form: MovementForm,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let nav = Nav::new(&auth, Some(&profile));

    let req = match form.to_request() {
        Ok(req) => req,
        Err(msg) => return render_form(&state.pool, nav, kind, &form, Some(msg)).await,
    };

    let result = match kind {
        MovementKind::Entry => inventory::register_entry(&state.pool, auth.user_id, &req).await,
        MovementKind::Exit => inventory::register_exit(&state.pool, auth.user_id, &req).await,
    };

    match result {
        Ok(_) => Ok(Redirect::to("/history").into_response()),
        Err(e) => render_form(&state.pool, nav, kind, &form, Some(e.user_message())).await,
    }
}

pub async fn entry_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Response, AppError> {
    movement_page(auth, state, MovementKind::Entry).await
}

pub async fn entry_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<MovementForm>,
) -> Result<Response, AppError> {
    movement_submit(auth, state, MovementKind::Entry, form).await
}

pub async fn exit_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Response, AppError> {
    movement_page(auth, state, MovementKind::Exit).await
}

pub async fn exit_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<MovementForm>,
) -> Result<Response, AppError> {
    movement_submit(auth, state, MovementKind::Exit, form).await
}

fn options(items: Vec<(Uuid, String)>, selected: Option<&str>) -> Vec<FilterOption> {
    items
        .into_iter()
        .map(|(id, label)| {
            let value = id.to_string();
            FilterOption {
                selected: selected == Some(value.as_str()),
                value,
                label,
            }
        })
        .collect()
}

pub async fn history(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;

    let (filter, error) = match query.to_filter() {
        Ok(filter) => (filter, None),
        Err(e) => (HistoryFilter::default(), Some(e.user_message())),
    };
    let movements = db::movements::list(&state.pool, &filter).await?;

    let products = db::products::list_names(&state.pool).await?;
    let responsibles = db::profiles::list_names(&state.pool)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p.name))
        .collect();

    let rows = movements
        .iter()
        .map(|m| HistoryRow {
            date: m.date.format("%Y-%m-%d").to_string(),
            product: m.product_label().to_string(),
            is_entry: m.is_entry(),
            kind_label: (if m.is_entry() { "Entry" } else { "Exit" }).to_string(),
            quantity: format!("{}{}", m.sign(), m.quantity),
            reason: m.reason.clone(),
            responsible: m.responsible_label().to_string(),
        })
        .collect();

    let template = HistoryTemplate {
        nav: Nav::new(&auth, profile.as_ref()),
        products: options(products, forms::non_empty(&query.product_id)),
        responsibles: options(responsibles, forms::non_empty(&query.responsible)),
        kind: forms::non_empty(&query.kind).unwrap_or_default().to_string(),
        date_from: query.date_from.clone().unwrap_or_default(),
        date_to: query.date_to.clone().unwrap_or_default(),
        rows,
        error,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_requires_a_product() {
        let form = MovementForm {
            quantity: "3".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_request().unwrap_err(), "Select a product");
    }

    #[test]
    fn form_converts_to_request() {
        let id = Uuid::now_v7();
        let form = MovementForm {
            product_id: id.to_string(),
            quantity: " 4 ".to_string(),
            reason: " Sale ".to_string(),
            date: "2024-05-01".to_string(),
        };
        let req = form.to_request().unwrap();
        assert_eq!(req.product_id, id);
        assert_eq!(req.quantity, 4);
        assert_eq!(req.reason, "Sale");
        assert_eq!(req.date.to_string(), "2024-05-01");
    }

    #[test]
    fn selected_option_is_marked() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let opts = options(
            vec![(a, "A".to_string()), (b, "B".to_string())],
            Some(b.to_string().as_str()),
        );
        assert!(!opts[0].selected);
        assert!(opts[1].selected);
    }
}
