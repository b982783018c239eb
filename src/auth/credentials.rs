//! Known identities and password verification.
//!
//! Records are loaded once from a JSON file and never change afterwards, so the
//! store is shared behind an `Arc` without any locking.

use anyhow::{Context, Result, anyhow, bail};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, fs, hint::black_box, path::Path, sync::Arc};
use tracing::debug;

use super::AuthError;

const SALT_BYTES: usize = 16;
const DECOY_PASSWORD_BYTES: usize = 32;

/// Authenticated principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    username: String,
    display_name: String,
}

impl Identity {
    #[must_use]
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// One entry of the credentials file.
#[derive(Clone, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Argon2 PHC string, e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`.
    pub password_hash: String,
}

impl CredentialRecord {
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
            password_hash: password_hash.into(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    users: Vec<CredentialRecord>,
}

struct StoredCredential {
    identity: Arc<Identity>,
    password_hash: String,
}

pub struct CredentialStore {
    credentials: HashMap<String, StoredCredential>,
    // Hash checked for unknown usernames so both paths cost one Argon2 run.
    decoy_hash: String,
}

impl CredentialStore {
    /// Build a store from already parsed records.
    ///
    /// # Errors
    /// Returns an error on empty or duplicate usernames and on hashes that are
    /// not complete Argon2 PHC strings.
    pub fn from_records(records: Vec<CredentialRecord>) -> Result<Self> {
        let mut credentials = HashMap::with_capacity(records.len());
        let mut decoy_hasher = None;

        for record in records {
            if record.username.is_empty() {
                bail!("credential record with an empty username");
            }

            let hasher = argon2_for(&record.password_hash).map_err(|err| {
                anyhow!(
                    "invalid password hash for user {}: {err}",
                    record.username
                )
            })?;

            if credentials.contains_key(&record.username) {
                bail!("duplicate username: {}", record.username);
            }

            if decoy_hasher.is_none() {
                decoy_hasher = Some(hasher);
            }

            let display_name = record
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| record.username.clone());

            let identity = Arc::new(Identity::new(record.username.clone(), display_name));
            credentials.insert(
                record.username,
                StoredCredential {
                    identity,
                    password_hash: record.password_hash,
                },
            );
        }

        // Same cost as a real record, so unknown users take as long as wrong passwords.
        let decoy_hash = random_decoy_hash(&decoy_hasher.unwrap_or_default())?;

        Ok(Self {
            credentials,
            decoy_hash,
        })
    }

    /// Load the credentials file (`{"users": [...]}`).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a record is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        let file: CredentialsFile = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid credentials file: {}", path.display()))?;
        Self::from_records(file.users)
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidUsernameOrPassword`] for unknown users and
    /// wrong passwords alike.
    pub fn verify(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Arc<Identity>, AuthError> {
        let Some(stored) = self.credentials.get(username) else {
            black_box(check_password(&self.decoy_hash, password.expose_secret()));
            debug!("unknown username");
            return Err(AuthError::InvalidUsernameOrPassword);
        };

        if check_password(&stored.password_hash, password.expose_secret()) {
            Ok(Arc::clone(&stored.identity))
        } else {
            debug!("password mismatch");
            Err(AuthError::InvalidUsernameOrPassword)
        }
    }

    #[must_use]
    pub fn identity(&self, username: &str) -> Option<Arc<Identity>> {
        self.credentials
            .get(username)
            .map(|stored| Arc::clone(&stored.identity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

// Argon2 instance matching a stored hash; rejects other algorithms and
// strings without a hash output, which could never verify.
fn argon2_for(password_hash: &str) -> Result<Argon2<'static>> {
    let parsed = PasswordHash::new(password_hash).map_err(|err| anyhow!("{err}"))?;
    let algorithm = Algorithm::try_from(parsed.algorithm)
        .map_err(|_| anyhow!("unsupported algorithm {}", parsed.algorithm))?;
    if parsed.hash.is_none() {
        bail!("missing hash output");
    }
    let version = match parsed.version {
        Some(version) => Version::try_from(version).map_err(|err| anyhow!("{err}"))?,
        None => Version::default(),
    };
    let params = Params::try_from(&parsed).map_err(|err| anyhow!("{err}"))?;
    Ok(Argon2::new(algorithm, version, params))
}

// Hash of a random password nobody knows.
fn random_decoy_hash(argon2: &Argon2<'_>) -> Result<String> {
    let mut password = [0u8; DECOY_PASSWORD_BYTES];
    OsRng
        .try_fill_bytes(&mut password)
        .context("failed to generate decoy password")?;
    hash_password_with(argon2, &URL_SAFE_NO_PAD.encode(password))
}

// Argon2 reads its parameters from the PHC string; the digest comparison is constant time.
fn check_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Hash a password with Argon2id default parameters.
///
/// # Errors
/// Returns an error if salt generation or hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with(&Argon2::default(), password)
}

/// Hash a password with a caller supplied Argon2 instance.
///
/// # Errors
/// Returns an error if salt generation or hashing fails.
pub fn hash_password_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .context("failed to generate password salt")?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| anyhow!("failed to encode password salt: {err}"))?;
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cheap_hash(password: &str) -> String {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        hash_password_with(&argon2, password).unwrap()
    }

    fn store() -> CredentialStore {
        CredentialStore::from_records(vec![
            CredentialRecord::new("alice", cheap_hash("secret1")).with_display_name("Alice"),
            CredentialRecord::new("bob", cheap_hash("hunter2")),
        ])
        .unwrap()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn verify_accepts_correct_password() {
        let identity = store().verify("alice", &secret("secret1")).unwrap();
        assert_eq!(identity.username(), "alice");
        assert_eq!(identity.display_name(), "Alice");
    }

    #[test]
    fn display_name_defaults_to_username() {
        let identity = store().verify("bob", &secret("hunter2")).unwrap();
        assert_eq!(identity.display_name(), "bob");
    }

    #[test]
    fn wrong_password_and_unknown_user_are_indistinguishable() {
        let store = store();
        let wrong = store.verify("alice", &secret("wrong")).unwrap_err();
        let unknown = store.verify("mallory", &secret("secret1")).unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidUsernameOrPassword));
        assert!(matches!(unknown, AuthError::InvalidUsernameOrPassword));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn another_users_password_does_not_open_unknown_account() {
        // a known user's password must not open an unknown account
        let result = store().verify("mallory", &secret("secret1"));
        assert!(result.is_err());
    }

    #[test]
    fn empty_store_denies() {
        let store = CredentialStore::from_records(Vec::new()).unwrap();
        assert!(store.is_empty());
        assert!(store.verify("alice", &secret("secret1")).is_err());
    }

    #[test]
    fn usernames_are_case_sensitive() {
        assert!(store().verify("Alice", &secret("secret1")).is_err());
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let result = CredentialStore::from_records(vec![
            CredentialRecord::new("alice", cheap_hash("a")),
            CredentialRecord::new("alice", cheap_hash("b")),
        ]);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("duplicate username"));
    }

    #[test]
    fn from_records_rejects_empty_username() {
        let result = CredentialStore::from_records(vec![CredentialRecord::new("", cheap_hash("a"))]);
        assert!(result.is_err());
    }

    #[test]
    fn from_records_rejects_plaintext_password() {
        let result = CredentialStore::from_records(vec![CredentialRecord::new("alice", "secret1")]);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("invalid password hash for user alice"));
    }

    #[test]
    fn from_records_rejects_hash_without_output() {
        let result = CredentialStore::from_records(vec![
            CredentialRecord::new("decoy", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0"),
            CredentialRecord::new("alice", cheap_hash("secret1")),
        ]);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("invalid password hash for user decoy"));
        assert!(err.to_string().contains("missing hash output"));
    }

    #[test]
    fn from_records_rejects_other_algorithms() {
        let result = CredentialStore::from_records(vec![CredentialRecord::new(
            "alice",
            "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA",
        )]);
        let err = result.err().unwrap();
        assert!(err.to_string().contains("unsupported algorithm"));
    }

    #[test]
    fn unknown_user_checks_a_full_hash_at_record_cost() {
        let record_hash = cheap_hash("secret1");
        let store =
            CredentialStore::from_records(vec![CredentialRecord::new("alice", record_hash.clone())])
                .unwrap();

        let decoy = PasswordHash::new(&store.decoy_hash).unwrap();
        let record = PasswordHash::new(&record_hash).unwrap();
        assert!(decoy.hash.is_some());
        assert_eq!(decoy.algorithm, record.algorithm);
        assert!(decoy.salt.is_some());
        assert_ne!(decoy.salt, record.salt);

        let decoy_params = Params::try_from(&decoy).unwrap();
        let record_params = Params::try_from(&record).unwrap();
        assert_eq!(decoy_params.m_cost(), record_params.m_cost());
        assert_eq!(decoy_params.t_cost(), record_params.t_cost());
        assert_eq!(decoy_params.p_cost(), record_params.p_cost());

        // nobody knows the decoy password
        assert!(!check_password(&store.decoy_hash, "secret1"));
        assert!(!check_password(&store.decoy_hash, ""));
    }

    #[test]
    fn empty_store_still_has_argon2_decoy() {
        let store = CredentialStore::from_records(Vec::new()).unwrap();
        let decoy = PasswordHash::new(&store.decoy_hash).unwrap();
        assert_eq!(decoy.algorithm, Algorithm::Argon2id.ident());
        assert!(decoy.hash.is_some());
    }

    #[test]
    fn from_file_loads_users() {
        let hash = cheap_hash("secret1");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = serde_json::json!({
            "users": [
                { "username": "alice", "display_name": "Alice", "password_hash": hash }
            ]
        });
        file.write_all(body.to_string().as_bytes()).unwrap();

        let store = CredentialStore::from_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.identity("alice").map(|i| i.display_name().to_string()),
            Some("Alice".to_string())
        );
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = CredentialStore::from_file("/nonexistent/users.json");
        let err = result.err().unwrap();
        assert!(err.to_string().contains("Failed to read credentials file"));
    }

    #[test]
    fn from_file_reports_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = CredentialStore::from_file(file.path()).err().unwrap();
        assert!(err.to_string().contains("Invalid credentials file"));
    }

    #[test]
    fn hash_password_uses_argon2id_and_random_salt() {
        let first = cheap_hash("secret1");
        let second = cheap_hash("secret1");
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(check_password(&first, "secret1"));
        assert!(!check_password(&first, "secret2"));
    }

    #[test]
    fn record_debug_redacts_hash() {
        let hash = cheap_hash("secret1");
        let rendered = format!("{:?}", CredentialRecord::new("alice", hash.clone()));
        assert!(!rendered.contains(&hash));
    }
}
