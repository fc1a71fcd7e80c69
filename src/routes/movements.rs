use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::gate::STOCK_EDITORS;
use crate::db;
use crate::db::movements::HistoryFilter;
use crate::error::AppError;
use crate::forms;
use crate::inventory::{self, MovementRequest};
use crate::models::{Movement, MovementKind, MovementRow, NewMovement};
use crate::state::SharedState;

/// History filters as they arrive in a query string. Blank values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub product_id: Option<String>,
    pub kind: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub responsible: Option<String>,
}

impl HistoryQuery {
    pub fn to_filter(&self) -> Result<HistoryFilter, AppError> {
        let parse_uuid = |label: &str, raw: Option<&str>| -> Result<Option<Uuid>, AppError> {
            raw.map(|s| {
                s.parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid {label}")))
            })
            .transpose()
        };
        let parse_date = |label: &str, raw: Option<&str>| -> Result<Option<NaiveDate>, AppError> {
            raw.map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| AppError::BadRequest(format!("Invalid {label}")))
            })
            .transpose()
        };

        Ok(HistoryFilter {
            product_id: parse_uuid("product_id", forms::non_empty(&self.product_id))?,
            kind: forms::non_empty(&self.kind)
                .map(|k| k.parse::<MovementKind>().map_err(AppError::BadRequest))
                .transpose()?,
            date_from: parse_date("date_from", forms::non_empty(&self.date_from))?,
            date_to: parse_date("date_to", forms::non_empty(&self.date_to))?,
            responsible: parse_uuid("responsible", forms::non_empty(&self.responsible))?,
            limit: None,
        })
    }
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MovementRow>>, AppError> {
    let filter = query.to_filter()?;
    Ok(Json(db::movements::list(&state.pool, &filter).await?))
}

fn to_request(req: NewMovement) -> MovementRequest {
    MovementRequest {
        product_id: req.product_id,
        quantity: req.quantity,
        reason: req.reason,
        date: req.date.unwrap_or_else(forms::today),
    }
}

pub async fn create_entry(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<NewMovement>,
) -> Result<Json<Movement>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let movement = inventory::register_entry(&state.pool, auth.user_id, &to_request(req)).await?;
    Ok(Json(movement))
}

pub async fn create_exit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<NewMovement>,
) -> Result<Json<Movement>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let movement = inventory::register_exit(&state.pool, auth.user_id, &to_request(req)).await?;
    Ok(Json(movement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_mean_any() {
        let q = HistoryQuery {
            product_id: Some(String::new()),
            kind: Some(" ".to_string()),
            ..Default::default()
        };
        let f = q.to_filter().unwrap();
        assert!(f.product_id.is_none() && f.kind.is_none() && f.date_from.is_none());
    }

    #[test]
    fn filters_are_parsed() {
        let q = HistoryQuery {
            kind: Some("exit".to_string()),
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-01-31".to_string()),
            ..Default::default()
        };
        let f = q.to_filter().unwrap();
        assert_eq!(f.kind, Some(MovementKind::Exit));
        assert_eq!(f.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(f.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn malformed_filters_are_bad_requests() {
        let q = HistoryQuery {
            kind: Some("transfer".to_string()),
            ..Default::default()
        };
        assert!(matches!(q.to_filter(), Err(AppError::BadRequest(_))));

        let q = HistoryQuery {
            responsible: Some("nobody".to_string()),
            ..Default::default()
        };
        assert!(matches!(q.to_filter(), Err(AppError::BadRequest(_))));
    }
}
