//! Login and logout orchestration.

use anyhow::Context;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{AuthError, CredentialStore, SessionRegistry, SessionToken};

pub struct Authenticator {
    credentials: Arc<CredentialStore>,
    sessions: Arc<SessionRegistry>,
}

impl Authenticator {
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Verify credentials and open a session.
    ///
    /// Nothing is registered unless a token is returned.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidUsernameOrPassword`] on any credential
    /// mismatch and [`AuthError::Internal`] if verification or token minting fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: SecretString,
    ) -> Result<SessionToken, AuthError> {
        // Argon2 is CPU bound; keep it off the async workers.
        let credentials = Arc::clone(&self.credentials);
        let owned_username = username.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            credentials.verify(&owned_username, &password)
        })
        .await
        .context("credential verification task failed")?;

        let identity = match verified {
            Ok(identity) => identity,
            Err(err) => {
                info!("login rejected");
                return Err(err);
            }
        };

        let token = self.sessions.issue(identity).await?;
        info!("login succeeded");

        Ok(token)
    }

    /// Close the session behind `token`, if any.
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{AccessGate, CredentialRecord, credentials::hash_password_with};
    use argon2::{Algorithm, Argon2, Params, Version};

    fn authenticator() -> Authenticator {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let hash = hash_password_with(&argon2, "secret1").unwrap();
        let credentials =
            CredentialStore::from_records(vec![CredentialRecord::new("alice", hash)]).unwrap();
        Authenticator::new(Arc::new(credentials), Arc::new(SessionRegistry::default()))
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn login_then_authorize_resolves_same_identity() {
        let authenticator = authenticator();
        let gate = AccessGate::new(Arc::clone(authenticator.sessions()));

        let token = authenticator.login("alice", secret("secret1")).await.unwrap();
        assert!(!token.as_str().is_empty());

        let identity = gate.authorize(Some(token.as_str())).await.unwrap();
        assert_eq!(identity.username(), "alice");
    }

    #[tokio::test]
    async fn failed_login_registers_nothing() {
        let authenticator = authenticator();

        let wrong = authenticator.login("alice", secret("wrong")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidUsernameOrPassword)));

        let unknown = authenticator.login("nobody", secret("secret1")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidUsernameOrPassword)));

        assert!(authenticator.sessions().is_empty().await);
    }

    #[tokio::test]
    async fn logout_revokes_session() {
        let authenticator = authenticator();
        let gate = AccessGate::new(Arc::clone(authenticator.sessions()));
        let token = authenticator.login("alice", secret("secret1")).await.unwrap();

        assert!(authenticator.logout(token.as_str()).await);
        assert!(!authenticator.logout(token.as_str()).await);
        assert!(matches!(
            gate.authorize(Some(token.as_str())).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_logins_get_distinct_tokens() {
        let authenticator = Arc::new(authenticator());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let authenticator = Arc::clone(&authenticator);
            handles.push(tokio::spawn(async move {
                authenticator
                    .login("alice", secret("secret1"))
                    .await
                    .unwrap()
                    .into_inner()
            }));
        }

        let mut tokens = std::collections::HashSet::new();
        for handle in handles {
            assert!(tokens.insert(handle.await.unwrap()));
        }
        assert_eq!(authenticator.sessions().len().await, 16);
    }
}
