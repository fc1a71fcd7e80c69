use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Profile, Role};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateProfile {
    pub name: String,
}

/// Update the display name, creating an `employee` profile on first save.
pub async fn save_profile(pool: &PgPool, user_id: Uuid, name: &str) -> Result<Profile, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let profile = match db::profiles::find_by_user(pool, user_id).await? {
        Some(_) => db::profiles::update_name(pool, user_id, name).await?,
        None => {
            tracing::info!(%user_id, "Creating profile on first save");
            db::profiles::create(pool, user_id, name, Role::Employee).await?
        }
    };
    Ok(profile)
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Profile>, AppError> {
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateProfile>,
) -> Result<Json<Profile>, AppError> {
    let profile = save_profile(&state.pool, auth.user_id, &req.name).await?;
    Ok(Json(profile))
}
