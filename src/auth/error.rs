//! Outcomes of the authentication core.

/// Every variant is terminal; none of them is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Never says which.
    #[error("invalid username or password")]
    InvalidUsernameOrPassword,

    /// Token missing, malformed, unknown or expired at the registry.
    #[error("invalid session")]
    InvalidSession,

    /// The access gate found no usable session for the request.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// `true` for faults that must surface as an internal error instead of a denial.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
