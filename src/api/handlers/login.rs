//! Login page and form submission.

use anyhow::Context;
use axum::{
    Form,
    extract::{Extension, rejection::FormRejection},
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::api::{
    AuthState,
    error::AppError,
    session::{HOME_PATH, session_cookie},
    views,
};
use crate::auth::{AuthError, SessionContext};

#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

// axum handler for the login page; runs behind `attach_session`
pub async fn login_page(Extension(context): Extension<SessionContext>) -> Html<String> {
    views::login_page(false, context.identity())
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Login succeeded, session cookie set, redirect to /"),
        (status = 200, description = "Login failed, login view re-rendered with invalidLogin", content_type = "text/html")
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(auth_state): Extension<Arc<AuthState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(|rejection| {
        debug!("login form rejected: {rejection}");
        AppError::Rejected(rejection.status())
    })?;

    match auth_state
        .authenticator()
        .login(&form.username, form.password)
        .await
    {
        Ok(token) => {
            let cookie = session_cookie(auth_state.config(), &token)
                .context("Failed to build session cookie")?;
            Ok(([(SET_COOKIE, cookie)], Redirect::to(HOME_PATH)).into_response())
        }
        Err(AuthError::Internal(err)) => Err(AppError::Internal(err)),
        Err(_) => Ok(views::login_page(true, None).into_response()),
    }
}
