//! # synthcast server
//!
//! HTTP front end for a [`RenderHost`](synthcast_core::RenderHost).
//!
//! `GET /<name>.wav?<json>` renders a clip, `GET /<name>.json?<json>` reports
//! the engine's parameters and programs. The JSON payload can also be sent as
//! the request body.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod translate;

pub use config::{Cli, ServerConfig};
pub use error::{Result, ServerError};
pub use server::RenderServer;
