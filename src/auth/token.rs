//! Session token generation and digesting.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::fmt;

/// Raw entropy per token.
pub const TOKEN_BYTES: usize = 32;
/// Length of a token once encoded as URL-safe base64 without padding.
pub const ENCODED_TOKEN_LEN: usize = 43;

/// SHA-256 of the encoded token; the only form the registry keeps.
pub type TokenDigest = [u8; 32];

/// Opaque session token handed to the browser.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Create a new session token for the auth cookie.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_session_token() -> Result<SessionToken> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(SessionToken(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Hash a session token so raw values never sit in the registry.
#[must_use]
pub fn digest(token: &str) -> TokenDigest {
    Sha256::digest(token.as_bytes()).into()
}

/// Digest a presented token, or `None` when it cannot be one we issued.
#[must_use]
pub fn digest_if_well_formed(token: &str) -> Option<TokenDigest> {
    if token.len() != ENCODED_TOKEN_LEN {
        return None;
    }
    let decoded = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
    (decoded.len() == TOKEN_BYTES).then(|| digest(token))
}
