use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::{session::LOGIN_PATH, views};
use crate::auth::SessionContext;

// axum handler for the protected page; runs behind `require_session`
pub async fn index(Extension(context): Extension<SessionContext>) -> Response {
    match context.identity() {
        Some(identity) => views::index_page(identity).into_response(),
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}
