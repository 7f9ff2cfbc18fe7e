//! Error types for synthcast-core.

use synthcast_export::ExportError;
use synthcast_plugin::PluginError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// No engine slot became free before the acquisition deadline.
    #[error("Timeout after {waited_ms}ms: no free engine slot")]
    Timeout { waited_ms: u64 },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Plugin: {0}")]
    Plugin(#[from] PluginError),

    #[error("Export: {0}")]
    Export(ExportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ExportError> for CoreError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnsupportedFormat(msg) => CoreError::UnsupportedFormat(msg),
            ExportError::InvalidOptions(msg) => CoreError::InvalidRequest(msg),
            other => CoreError::Export(other),
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
