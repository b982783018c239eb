use crate::{
    api::{self, state::AuthConfig},
    auth::CredentialStore,
};
use anyhow::Result;
use std::{path::PathBuf, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub users_file: PathBuf,
    pub session_ttl: Option<Duration>,
    pub session_sweep_interval: Duration,
    pub cookie_secure: bool,
}

/// Load the credentials file and serve until shutdown.
///
/// # Errors
/// Returns an error if the credentials file is invalid or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    debug!("server args: {:?}", args);

    let credentials = CredentialStore::from_file(&args.users_file)?;
    if credentials.is_empty() {
        warn!(
            "No users in {}, every login attempt will be denied",
            args.users_file.display()
        );
    } else {
        info!(
            "Loaded {} users from {}",
            credentials.len(),
            args.users_file.display()
        );
    }

    let config = AuthConfig::new()
        .with_session_ttl(args.session_ttl)
        .with_sweep_interval(args.session_sweep_interval)
        .with_cookie_secure(args.cookie_secure);

    api::new(args.port, credentials, config).await
}
