use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_SWEEP_SECONDS: &str = "session-sweep-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime in seconds; unset or 0 keeps sessions until logout or restart")
                .env("WUZZLMOASTA_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_SWEEP_SECONDS)
                .long(ARG_SESSION_SWEEP_SECONDS)
                .help("Interval for purging expired sessions")
                .env("WUZZLMOASTA_SESSION_SWEEP_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("WUZZLMOASTA_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_ttl: Option<Duration>,
    pub sweep_interval: Duration,
    pub cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing from the matches.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_ttl = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs);

        let sweep_interval = matches
            .get_one::<u64>(ARG_SESSION_SWEEP_SECONDS)
            .copied()
            .map(Duration::from_secs)
            .context("missing required argument: --session-sweep-seconds")?;

        Ok(Self {
            session_ttl,
            sweep_interval,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        })
    }
}
