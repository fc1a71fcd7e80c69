use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Page requests never show raw auth errors: a missing session goes to the
/// login page, a role refusal goes back to the dashboard.
pub async fn redirect_unauthorized(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    match response.status() {
        StatusCode::UNAUTHORIZED => Redirect::to("/auth/login").into_response(),
        StatusCode::FORBIDDEN => Redirect::to("/dashboard").into_response(),
        _ => response,
    }
}
