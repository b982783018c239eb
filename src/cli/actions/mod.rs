pub mod hash;
pub mod run;
pub mod server;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword(hash::Args),
}
