use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure, or the store answered with a non-success status.
    #[error("request to the record store failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("no brew status is recorded for machine {0}")]
    StatusNotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("monitoring task ended abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
