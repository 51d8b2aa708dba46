use thiserror::Error;

use crate::board::JobId;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    /// Network failures, timeouts and unexpected server statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, BoardError::Transport(_) | BoardError::Http(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BoardError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
