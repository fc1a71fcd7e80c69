use axum::extract::State;
use axum::Json;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::inventory::dashboard::{self, Dashboard};
use crate::state::SharedState;

pub async fn summary(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Dashboard>, AppError> {
    let data = dashboard::load(&state.pool, state.config.dashboard_sample_limit).await?;
    Ok(Json(data))
}
