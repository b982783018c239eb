use crate::auth::hash_password;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub password: SecretString,
}

/// Print the Argon2id PHC string for a password.
///
/// # Errors
/// Returns an error if hashing fails.
pub async fn execute(args: Args) -> Result<()> {
    let hash = tokio::task::spawn_blocking(move || hash_password(args.password.expose_secret()))
        .await
        .context("password hashing task failed")??;

    println!("{hash}");

    Ok(())
}
