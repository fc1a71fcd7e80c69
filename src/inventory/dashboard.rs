use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::MovementRow;

pub const RECENT_MOVEMENTS: i64 = 5;

/// The columns the dashboard aggregates need from each product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockSample {
    pub stock: i32,
    pub min_stock: i32,
    pub entry_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSummary {
    pub low_stock_count: usize,
    pub inventory_value: Decimal,
}

pub fn summarize(samples: &[StockSample]) -> StockSummary {
    let low_stock_count = samples.iter().filter(|s| s.stock < s.min_stock).count();
    let inventory_value = samples
        .iter()
        .map(|s| Decimal::from(s.stock) * s.entry_price)
        .sum();
    StockSummary {
        low_stock_count,
        inventory_value,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_products: i64,
    #[serde(flatten)]
    pub summary: StockSummary,
    pub recent_movements: Vec<MovementRow>,
}

pub async fn load(pool: &PgPool, sample_limit: i64) -> Result<Dashboard, AppError> {
    let (total_products, samples, recent_movements) = tokio::try_join!(
        db::products::count(pool),
        db::products::stock_sample(pool, sample_limit),
        db::movements::recent(pool, RECENT_MOVEMENTS),
    )?;

    Ok(Dashboard {
        total_products,
        summary: summarize(&samples),
        recent_movements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(stock: i32, min_stock: i32, price_cents: i64) -> StockSample {
        StockSample {
            stock,
            min_stock,
            entry_price: Decimal::new(price_cents, 2),
        }
    }

    #[test]
    fn empty_sample_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.low_stock_count, 0);
        assert_eq!(summary.inventory_value, Decimal::ZERO);
    }

    #[test]
    fn low_stock_is_strictly_below_minimum() {
        let samples = [sample(2, 5, 100), sample(5, 5, 100), sample(9, 5, 100), sample(0, 1, 100)];
        assert_eq!(summarize(&samples).low_stock_count, 2);
    }

    #[test]
    fn inventory_value_is_stock_times_entry_price() {
        let samples = [sample(3, 0, 1050), sample(10, 0, 199), sample(0, 0, 99999)];
        // 3 * 10.50 + 10 * 1.99 + 0
        assert_eq!(summarize(&samples).inventory_value, Decimal::new(5140, 2));
    }
}
