//! # synthcast core
//!
//! Shared access to stateful synthesizer engines and the render pipeline
//! that runs requests against them.
//!
//! - [`EngineSlot`]: one engine behind a lock
//! - [`InstancePool`]: fixed slots with deadline-bounded acquisition, or a
//!   fresh engine per request
//! - [`RenderPipeline`]: reset, program, parameters, then audio or a snapshot
//! - [`RenderHost`]: ties the pool, captured defaults and pipeline together
//!
//! ```ignore
//! use synthcast_core::{RenderHost, RenderRequest};
//!
//! let host = RenderHost::builder().plugin("builtin:poly").build()?;
//! let output = host.render(&RenderRequest::default())?;
//! let wav = output.into_body()?;
//! ```

pub mod error;
pub use error::{CoreError, Result};

mod config;
pub use config::{HostConfig, RenderLimits};

pub mod slot;
pub use slot::{EngineSlot, SlotGuard};

pub mod pool;
pub use pool::{InstancePool, Lease, PluginFactory};

mod request;
pub use request::{RenderRequest, ResponseKind};

mod snapshot;
pub use snapshot::{IndexedParameter, PluginSnapshot};

pub mod pipeline;
pub use pipeline::{RenderOutput, RenderPipeline};

mod builder;
pub use builder::RenderHostBuilder;

mod host;
pub use host::RenderHost;

pub use synthcast_export::ContainerKind;
