//! Centralized error type for the synthcast umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] synthcast_core::CoreError),

    #[error("Plugin: {0}")]
    Plugin(#[from] synthcast_plugin::PluginError),

    #[error("Export: {0}")]
    Export(#[from] synthcast_export::ExportError),

    #[cfg(feature = "server")]
    #[error("Server: {0}")]
    Server(#[from] synthcast_server::ServerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
