use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Movement, MovementKind, MovementRow};

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub product_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub responsible: Option<Uuid>,
    pub limit: Option<i64>,
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    product_id: Uuid,
    kind: MovementKind,
    quantity: i32,
    reason: &str,
    responsible: Uuid,
    date: NaiveDate,
) -> Result<Movement, sqlx::Error> {
    sqlx::query_as::<_, Movement>(
        "INSERT INTO movements (product_id, kind, quantity, reason, responsible, date)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(product_id)
    .bind(kind.as_str())
    .bind(quantity)
    .bind(reason)
    .bind(responsible)
    .bind(date)
    .fetch_one(executor)
    .await
}

pub async fn list(pool: &PgPool, filter: &HistoryFilter) -> Result<Vec<MovementRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT m.*, p.name AS product_name, pr.name AS responsible_name
         FROM movements m
         LEFT JOIN products p ON p.id = m.product_id
         LEFT JOIN profiles pr ON pr.user_id = m.responsible
         WHERE TRUE",
    );

    if let Some(product_id) = filter.product_id {
        qb.push(" AND m.product_id = ").push_bind(product_id);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND m.kind = ").push_bind(kind.as_str());
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND m.date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND m.date <= ").push_bind(to);
    }
    if let Some(responsible) = filter.responsible {
        qb.push(" AND m.responsible = ").push_bind(responsible);
    }

    qb.push(" ORDER BY m.date DESC, m.created_at DESC");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    qb.build_query_as::<MovementRow>().fetch_all(pool).await
}

pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<MovementRow>, sqlx::Error> {
    list(
        pool,
        &HistoryFilter {
            limit: Some(limit),
            ..Default::default()
        },
    )
    .await
}
