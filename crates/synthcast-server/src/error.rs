//! Error types for synthcast-server.

use synthcast_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render host: {0}")]
    Core(#[from] CoreError),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Request body of {size} bytes exceeds limit of {limit}")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
