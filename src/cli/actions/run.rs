use crate::cli::actions::{Action, hash, server};
use anyhow::Result;

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
            Self::HashPassword(args) => hash::execute(args).await,
        }
    }
}
