//! # synthcast
//!
//! Renders short audio clips from a hosted synthesizer on request, and
//! reports the synthesizer's parameter and program state.
//!
//! ## Architecture
//!
//! synthcast is an umbrella crate over:
//! - **synthcast-plugin** - Engine handles (built-in synth, VST2 hosting)
//! - **synthcast-export** - Block-streaming WAV and FLAC encoders
//! - **synthcast-core** - Engine pool, render pipeline, render host
//! - **synthcast-server** - HTTP front end (`server` feature)
//!
//! ## Quick Start
//!
//! ```ignore
//! use synthcast::prelude::*;
//!
//! let host = RenderHost::builder()
//!     .plugin("builtin:poly")
//!     .pool_size(2)
//!     .build()?;
//!
//! let request = RenderRequest {
//!     preset_number: 1,
//!     ..Default::default()
//! };
//! let wav = host.render(&request)?.into_body()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default) - WAV output
//! - `flac` (default) - FLAC output
//! - `server` (default) - HTTP front end
//! - `vst2` - Host VST2 plugins

/// Re-export of synthcast-core for direct access
pub use synthcast_core as core;

/// Engine handles and MIDI types
pub use synthcast_plugin as plugin;

/// Container encoders
pub use synthcast_export as export;

/// HTTP front end
#[cfg(feature = "server")]
pub use synthcast_server as server;

pub use synthcast_core::{
    ContainerKind, EngineSlot, HostConfig, InstancePool, Lease, PluginFactory, PluginSnapshot,
    RenderHost, RenderHostBuilder, RenderLimits, RenderOutput, RenderPipeline, RenderRequest,
    ResponseKind,
};
pub use synthcast_plugin::{load_plugin, PluginInstance};

mod error;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result};

    // Render host
    pub use crate::core::{HostConfig, RenderHost, RenderHostBuilder, RenderOutput, RenderRequest};

    // Engines
    pub use crate::plugin::{load_plugin, MidiEvent, PluginInstance, ProcessContext};

    // HTTP
    #[cfg(feature = "server")]
    pub use crate::server::{RenderServer, ServerConfig};
}
