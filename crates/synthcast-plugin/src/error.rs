//! Error types for plugin loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Scanning,
    Opening,
    Instantiation,
    Initialization,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Scanning => write!(f, "scanning"),
            LoadStage::Opening => write!(f, "opening library"),
            LoadStage::Instantiation => write!(f, "creating instance"),
            LoadStage::Initialization => write!(f, "initializing processor"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin load failed at {stage} stage: {path}\n  Reason: {reason}")]
    LoadFailed {
        path: PathBuf,
        stage: LoadStage,
        reason: String,
    },

    #[error("Unknown built-in engine: {0}")]
    UnknownBuiltin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    pub(crate) fn load_failed(
        path: impl Into<PathBuf>,
        stage: LoadStage,
        reason: impl Into<String>,
    ) -> Self {
        PluginError::LoadFailed {
            path: path.into(),
            stage,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
