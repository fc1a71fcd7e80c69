use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::ACCESS_COOKIE;
use crate::auth::jwt;
use crate::routes::auth::{clear_session_cookie, session_cookie, sign_in};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    email: String,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    // Already signed in
    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        if jwt::decode_token(cookie.value(), &state.config.jwt_secret).is_ok() {
            return Redirect::to("/dashboard").into_response();
        }
    }

    let template = LoginTemplate {
        email: String::new(),
        error: None,
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn login_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match sign_in(&state, &form.email, &form.password).await {
        Ok((_, token)) => {
            let jar = jar.add(session_cookie(&token, state.config.cookie_secure));
            (jar, Redirect::to("/dashboard")).into_response()
        }
        Err(e) => {
            let template = LoginTemplate {
                email: form.email,
                error: Some(e.user_message()),
            };
            Html(template.render().unwrap_or_default()).into_response()
        }
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(clear_session_cookie()), Redirect::to("/auth/login"))
}
