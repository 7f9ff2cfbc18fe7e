//! Error types for synthcast-export

use std::io;
use thiserror::Error;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No encoder for the container, or the container's feature is not enabled
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid audio data: {0}")]
    InvalidData(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(feature = "wav")]
impl From<hound::Error> for ExportError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => ExportError::Io(io),
            other => ExportError::Encoding(other.to_string()),
        }
    }
}
