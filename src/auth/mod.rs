//! Authentication and session validity.
//!
//! Flow Overview:
//! - [`CredentialStore`] verifies a username/password pair against Argon2 hashes.
//! - [`SessionRegistry`] maps opaque tokens to identities, with optional expiry.
//! - [`Authenticator`] ties the two together for login and logout.
//! - [`AccessGate`] turns a presented token into an identity or a denial.
//!
//! Security boundaries: unknown usernames and wrong passwords are reported the
//! same way, and the registry only ever stores token digests.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod registry;
pub mod token;

pub use authenticator::Authenticator;
pub use credentials::{CredentialRecord, CredentialStore, Identity, hash_password};
pub use error::AuthError;
pub use gate::{AccessGate, SessionContext};
pub use registry::{Session, SessionRegistry};
pub use token::SessionToken;
