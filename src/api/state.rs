//! Auth state and configuration shared by the HTTP layer.

use std::{sync::Arc, time::Duration};

use crate::auth::{AccessGate, Authenticator, CredentialStore, SessionRegistry};

const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl: Option<Duration>,
    sweep_interval: Duration,
    cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl: None,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS),
            cookie_secure: false,
        }
    }

    /// `None` keeps sessions alive until logout or restart.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

pub struct AuthState {
    config: AuthConfig,
    authenticator: Authenticator,
    gate: AccessGate,
}

impl AuthState {
    /// Wire one session registry into both the authenticator and the gate.
    #[must_use]
    pub fn new(credentials: CredentialStore, config: AuthConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session_ttl()));
        let authenticator = Authenticator::new(Arc::new(credentials), Arc::clone(&sessions));
        let gate = AccessGate::new(sessions);
        Self {
            config,
            authenticator,
            gate,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        self.authenticator.sessions()
    }
}
