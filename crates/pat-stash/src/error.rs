use pat_core::{ExitReason, RetryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("failed to create stash http client: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error(transparent)]
    Retry(#[from] RetryError),
    #[error("failed to decode stash response as json: {0}")]
    UndecodableBody(#[source] serde_json::Error),
    #[error("stash didn't return a token in the response")]
    MissingToken,
    #[error("stash didn't return an id in the response")]
    MissingId,
}

impl StashError {
    pub fn exit_reason(&self) -> ExitReason {
        match self {
            StashError::ClientSetup(_) => ExitReason::ClientSetup,
            StashError::Retry(error) => error.exit_reason(),
            StashError::UndecodableBody(_) => ExitReason::UndecodableBody,
            StashError::MissingToken => ExitReason::MissingToken,
            StashError::MissingId => ExitReason::MissingId,
        }
    }
}
