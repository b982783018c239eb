pub mod auth;
pub mod logging;

use crate::GIT_COMMIT_HASH;
use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_USERS_FILE: &str = "users-file";
pub const CMD_HASH_PASSWORD: &str = "hash-password";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let git_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        GIT_COMMIT_HASH
    };
    let long_version: &'static str =
        Box::leak(format!("{} - {}", env!("CARGO_PKG_VERSION"), git_hash).into_boxed_str());

    let command = Command::new("wuzzlmoasta")
        .about("Login-gated web page with cookie sessions")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("WUZZLMOASTA_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_USERS_FILE)
                .short('u')
                .long(ARG_USERS_FILE)
                .help("JSON file with usernames and Argon2 password hashes")
                .env("WUZZLMOASTA_USERS_FILE")
                .required(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .subcommand(
            Command::new(CMD_HASH_PASSWORD)
                .about("Print an Argon2id hash to paste into the users file")
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .help("Password to hash")
                        .required(true),
                ),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}
