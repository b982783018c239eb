use axum::{
    extract::Extension,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::api::{
    AuthState,
    session::{LOGIN_PATH, clear_session_cookie, extract_session_token},
};

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Session revoked, cookie cleared, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        auth_state.authenticator().logout(&token).await;
    }

    // Always clear the cookie, even if the session was already gone.
    let mut response = Redirect::to(LOGIN_PATH).into_response();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    response
}
