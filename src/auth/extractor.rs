use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::gate;
use crate::auth::jwt;
use crate::error::AppError;
use crate::models::{Profile, Role};
use crate::state::SharedState;

pub const ACCESS_COOKIE: &str = "access_token";

/// The signed-in user. Extraction fails with `Unauthorized` when no valid
/// token is present.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl AuthUser {
    /// Re-reads the profile and checks its role against `allowed`.
    pub async fn require_role(&self, pool: &PgPool, allowed: &[Role]) -> Result<Profile, AppError> {
        gate::require_role(pool, self.user_id, allowed).await
    }
}

impl From<jwt::Claims> for AuthUser {
    fn from(claims: jwt::Claims) -> Self {
        AuthUser {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Bearer token from Authorization header first
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let claims = jwt::decode_token(token, &state.config.jwt_secret)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
                return Ok(claims.into());
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(ACCESS_COOKIE) {
            let claims = jwt::decode_token(cookie.value(), &state.config.jwt_secret)
                .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
            return Ok(claims.into());
        }

        Err(AppError::Unauthorized(
            "Missing authentication token".to_string(),
        ))
    }
}
