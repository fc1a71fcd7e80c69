use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Profile, ProfileName, Role};

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    name: &str,
    role: Role,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (user_id, name, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(name)
    .bind(role.as_str())
    .fetch_one(executor)
    .await
}

/// Only the display name is user-editable; roles are managed by administrators.
pub async fn update_name(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET name = $2, updated_at = now() WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn list_names(pool: &PgPool) -> Result<Vec<ProfileName>, sqlx::Error> {
    sqlx::query_as::<_, ProfileName>("SELECT user_id, name FROM profiles ORDER BY name")
        .fetch_all(pool)
        .await
}
