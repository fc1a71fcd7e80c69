pub mod catalog;
pub mod dashboard;
pub mod stock;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Movement, MovementKind};

use stock::StockError;

#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reason: String,
    pub date: NaiveDate,
}

impl MovementRequest {
    fn check_reason(&self) -> Result<(), AppError> {
        if self.reason.trim().is_empty() {
            return Err(AppError::BadRequest("Reason is required".to_string()));
        }
        Ok(())
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Adds `quantity` units and appends one `entry` movement in a single transaction.
///
/// A sum past `i32::MAX` is rejected as a bad request, both up front and
/// when a concurrent entry pushes the row over in between.
pub async fn register_entry(
    pool: &PgPool,
    responsible: Uuid,
    req: &MovementRequest,
) -> Result<Movement, AppError> {
    stock::validate_entry(req.quantity)?;

    let product = db::products::find_by_id(pool, req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    stock::validate_capacity(product.stock, req.quantity)?;
    req.check_reason()?;

    let mut tx = pool.begin().await?;
    let Some(new_stock) =
        db::products::increment_stock(&mut *tx, req.product_id, req.quantity).await?
    else {
        tx.rollback().await?;
        let current = db::products::find_by_id(pool, req.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
        return Err(StockError::Overflow {
            stock: current.stock,
            requested: req.quantity,
        }
        .into());
    };

    let movement = db::movements::insert(
        &mut *tx,
        req.product_id,
        MovementKind::Entry,
        req.quantity,
        req.reason.trim(),
        responsible,
        req.date,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        product_id = %req.product_id,
        quantity = req.quantity,
        new_stock,
        "Stock entry registered"
    );
    Ok(movement)
}

/// Removes `quantity` units and appends one `exit` movement.
///
/// The decrement is conditional on `stock >= quantity`, so two concurrent
/// exits cannot both consume the same units; the loser gets the same
/// insufficient-stock error as a plain over-request.
pub async fn register_exit(
    pool: &PgPool,
    responsible: Uuid,
    req: &MovementRequest,
) -> Result<Movement, AppError> {
    stock::validate_entry(req.quantity)?;

    let product = db::products::find_by_id(pool, req.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    stock::validate_exit(product.stock, req.quantity)?;
    req.check_reason()?;

    let mut tx = pool.begin().await?;
    let Some(new_stock) =
        db::products::decrement_stock(&mut *tx, req.product_id, req.quantity).await?
    else {
        tx.rollback().await?;
        let current = db::products::find_by_id(pool, req.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
        tracing::warn!(
            product_id = %req.product_id,
            requested = req.quantity,
            stock = current.stock,
            "Stock changed underneath exit"
        );
        return Err(StockError::Insufficient {
            stock: current.stock,
            requested: req.quantity,
        }
        .into());
    };

    let movement = db::movements::insert(
        &mut *tx,
        req.product_id,
        MovementKind::Exit,
        req.quantity,
        req.reason.trim(),
        responsible,
        req.date,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        product_id = %req.product_id,
        quantity = req.quantity,
        new_stock,
        "Stock exit registered"
    );
    Ok(movement)
}
