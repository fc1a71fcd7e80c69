use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::{AuthUser, ACCESS_COOKIE};
use crate::auth::jwt::{encode_token, Claims, SESSION_HOURS};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::{Profile, User};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub profile: Option<Profile>,
}

pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_HOURS))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Verify credentials and issue an access token. Shared by the JSON API and
/// the login form.
pub async fn sign_in(
    state: &SharedState,
    email: &str,
    password_input: &str,
) -> Result<(User, String), AppError> {
    let email = email.trim();
    if email.is_empty() || password_input.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    if state.login_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_email(&state.pool, email).await? else {
        password::verify_dummy(password_input);
        state.login_limiter.record_failure(email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(password_input, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(email);
        tracing::info!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    state.login_limiter.reset(email);

    let token = encode_token(
        &Claims::new(user.id, user.email.clone()),
        &state.config.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    tracing::info!(user_id = %user.id, "User signed in");
    Ok((user, token))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let (_, access_token) = sign_in(&state, &req.email, &req.password).await?;
    let jar = CookieJar::new().add(session_cookie(&access_token, state.config.cookie_secure));
    Ok((jar, Json(AuthResponse { access_token })))
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    (
        CookieJar::new().add(clear_session_cookie()),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(MeResponse { user, profile }))
}
