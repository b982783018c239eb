//! Access gate: session token in, identity or denial out.

use std::sync::Arc;
use tracing::debug;

use super::{AuthError, Identity, SessionRegistry};

/// Decision point consulted before any protected operation.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<SessionRegistry>,
}

impl AccessGate {
    #[must_use]
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    /// Resolve the token carried by a request.
    ///
    /// Missing or empty tokens are denied without touching the registry.
    ///
    /// # Errors
    /// Returns [`AuthError::Unauthenticated`] when no valid session exists.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Arc<Identity>, AuthError> {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return Err(AuthError::Unauthenticated);
        };

        match self.sessions.resolve(token).await {
            Ok(identity) => Ok(identity),
            Err(AuthError::Internal(err)) => Err(AuthError::Internal(err)),
            Err(err) => {
                debug!("session rejected: {err}");
                Err(AuthError::Unauthenticated)
            }
        }
    }

    /// Soft gate: same resolution, but only records whether a session exists.
    pub async fn annotate(&self, token: Option<&str>) -> SessionContext {
        match self.authorize(token).await {
            Ok(identity) => SessionContext::authenticated(identity),
            Err(_) => SessionContext::anonymous(),
        }
    }
}

/// Per-request view of who is signed in, set once by the gate.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    identity: Option<Arc<Identity>>,
}

impl SessionContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub fn authenticated(identity: Arc<Identity>) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }
}
