use crate::cli::{
    actions::{Action, hash, server},
    commands::{ARG_PASSWORD, ARG_PORT, ARG_USERS_FILE, CMD_HASH_PASSWORD, auth},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Turn parsed arguments into the action to run.
///
/// # Errors
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub_m) = matches.subcommand_matches(CMD_HASH_PASSWORD) {
        let password = sub_m
            .get_one::<String>(ARG_PASSWORD)
            .cloned()
            .context("missing required argument: <password>")?;

        return Ok(Action::HashPassword(hash::Args {
            password: SecretString::from(password),
        }));
    }

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
        users_file: matches
            .get_one::<PathBuf>(ARG_USERS_FILE)
            .cloned()
            .context("missing required argument: --users-file")?,
        session_ttl: auth_opts.session_ttl,
        session_sweep_interval: auth_opts.sweep_interval,
        cookie_secure: auth_opts.cookie_secure,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    #[test]
    fn test_server_action() {
        temp_env::with_vars(
            [
                ("WUZZLMOASTA_PORT", None::<&str>),
                ("WUZZLMOASTA_USERS_FILE", None),
                ("WUZZLMOASTA_SESSION_TTL_SECONDS", None),
                ("WUZZLMOASTA_COOKIE_SECURE", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "wuzzlmoasta",
                    "-p",
                    "3000",
                    "-u",
                    "users.json",
                    "--session-ttl-seconds",
                    "900",
                    "--cookie-secure",
                ]);

                let Action::Server(args) = handler(&matches).unwrap() else {
                    panic!("expected server action");
                };
                assert_eq!(args.port, 3000);
                assert_eq!(args.users_file, PathBuf::from("users.json"));
                assert_eq!(args.session_ttl, Some(Duration::from_secs(900)));
                assert!(args.cookie_secure);
            },
        );
    }

    #[test]
    fn test_hash_password_action() {
        let matches =
            commands::new().get_matches_from(vec!["wuzzlmoasta", "hash-password", "secret1"]);

        let Action::HashPassword(args) = handler(&matches).unwrap() else {
            panic!("expected hash-password action");
        };
        assert_eq!(args.password.expose_secret(), "secret1");
    }
}
