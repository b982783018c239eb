//! Route handlers.

pub mod health;
pub mod login;
pub mod logout;
pub mod root;

use axum::http::StatusCode;

use super::error::AppError;

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Known path, unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::Rejected(StatusCode::METHOD_NOT_ALLOWED)
}
