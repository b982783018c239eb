//! # Wuzzlmoasta
//!
//! A single protected page behind a username/password login.
//!
//! ## Authentication
//!
//! Credentials are loaded once at start-up from a JSON file holding Argon2 PHC
//! strings. A successful login mints an opaque session token that travels in
//! the `UserSessionId` cookie. Only the SHA-256 digest of a token is kept in
//! the in-memory session registry, so restarting the process signs everyone out.
//!
//! ## Access control
//!
//! Every protected route runs through the access gate, which resolves the
//! cookie into an [`auth::Identity`] or redirects to `/login`. Pages that only
//! render differently for signed-in users use the soft gate, which annotates
//! the request without blocking it.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
