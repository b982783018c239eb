//! Live sessions keyed by token digest.
//!
//! Flow Overview:
//! - `issue` mints a token, stores its SHA-256 digest and hands the raw token back once.
//! - `resolve` digests the presented token and looks it up; expired entries are dropped.
//! - `revoke` forgets a token; revoking twice is the same as revoking once.
//!
//! All operations go through one `RwLock`, so an entry is either fully
//! inserted or not visible at all.

use anyhow::anyhow;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    AuthError,
    credentials::Identity,
    token::{self, SessionToken, TokenDigest},
};

const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    identity: Arc<Identity>,
    created_at: Instant,
    expires_at: Option<Instant>,
}

impl Session {
    /// Internal identifier, safe to log.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<TokenDigest, Session>>,
    ttl: Option<Duration>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionRegistry {
    /// `ttl` of `None` keeps sessions until revoked or the process exits.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Register a new session for `identity` and return its token.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if the random source fails or no unused
    /// token could be produced.
    pub async fn issue(&self, identity: Arc<Identity>) -> Result<SessionToken, AuthError> {
        let mut sessions = self.sessions.write().await;

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let token = token::generate_session_token()?;
            let digest = token::digest(token.as_str());
            if sessions.contains_key(&digest) {
                warn!("session token collision, regenerating");
                continue;
            }

            let now = Instant::now();
            let session = Session {
                id: Uuid::new_v4(),
                identity,
                created_at: now,
                expires_at: self.ttl.map(|ttl| now + ttl),
            };
            debug!(
                session_id = %session.id,
                username = session.identity.username(),
                "session issued"
            );
            sessions.insert(digest, session);

            return Ok(token);
        }

        Err(AuthError::Internal(anyhow!(
            "could not allocate a unique session token"
        )))
    }

    /// Resolve a token to the identity it was issued for.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidSession`] for empty, malformed, unknown or expired tokens.
    pub async fn resolve(&self, token: &str) -> Result<Arc<Identity>, AuthError> {
        let Some(digest) = token::digest_if_well_formed(token) else {
            return Err(AuthError::InvalidSession);
        };
        let now = Instant::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(&digest) {
                None => return Err(AuthError::InvalidSession),
                Some(session) if !session.is_expired(now) => {
                    return Ok(Arc::clone(&session.identity));
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions
            .get(&digest)
            .is_some_and(|session| session.is_expired(now))
        {
            if let Some(session) = sessions.remove(&digest) {
                debug!(session_id = %session.id, "expired session removed");
            }
        }

        Err(AuthError::InvalidSession)
    }

    /// Forget a token. Returns whether a session was removed.
    pub async fn revoke(&self, token: &str) -> bool {
        let Some(digest) = token::digest_if_well_formed(token) else {
            return false;
        };
        let removed = self.sessions.write().await.remove(&digest);
        match removed {
            Some(session) => {
                debug!(session_id = %session.id, "session revoked");
                true
            }
            None => false,
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically purge expired sessions until the runtime shuts down.
pub fn spawn_sweeper(registry: Arc<SessionRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;

            let purged = registry.purge_expired().await;
            if purged > 0 {
                debug!(purged, "expired sessions purged");
            }
        }
    })
}
