//! Render host configuration.

use crate::{CoreError, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Plugin file path or `builtin:<name>`.
    pub plugin: String,

    /// Numeric variant selector passed to the loader.
    pub variant: i32,

    /// Number of pooled engine slots. 0 builds a fresh engine per request.
    pub pool_size: usize,

    /// Longest a request waits for a free slot.
    pub acquire_timeout: Duration,

    /// Sleep between full sweeps of a busy pool.
    pub backoff: Duration,

    /// Capture parameter values from the first engine at startup and restore
    /// them before every request. Some engines misbehave when their whole
    /// parameter bank is written back, so this can be turned off.
    pub capture_defaults: bool,

    /// Bounds on what a single request may ask the engine to render.
    pub limits: RenderLimits,
}

/// Upper bounds on the audio fields of a request. Every buffer a render
/// allocates is sized from these fields, so they are checked before an engine
/// is acquired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLimits {
    pub max_render_seconds: f64,
    pub max_sample_rate: u32,
    pub max_block_size: u32,
    pub max_channels: u16,
    /// Rendered frames times channels.
    pub max_total_samples: u64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_render_seconds: 30.0,
            max_sample_rate: 192_000,
            max_block_size: 65_536,
            max_channels: 32,
            max_total_samples: 32 * 1024 * 1024,
        }
    }
}

impl RenderLimits {
    pub fn validate(&self) -> Result<()> {
        if !self.max_render_seconds.is_finite() || self.max_render_seconds <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "max_render_seconds {} must be positive",
                self.max_render_seconds
            )));
        }
        if self.max_sample_rate == 0
            || self.max_block_size == 0
            || self.max_channels == 0
            || self.max_total_samples == 0
        {
            return Err(CoreError::InvalidConfig(
                "render limits must all be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugin: "builtin:poly".to_string(),
            variant: 0,
            pool_size: 1,
            acquire_timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(10),
            capture_defaults: true,
            limits: RenderLimits::default(),
        }
    }
}

impl HostConfig {
    pub fn is_unpooled(&self) -> bool {
        self.pool_size == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.plugin.trim().is_empty() {
            return Err(CoreError::InvalidConfig("plugin identifier is empty".into()));
        }
        if self.backoff.is_zero() {
            return Err(CoreError::InvalidConfig("backoff must be > 0".into()));
        }
        self.limits.validate()
    }
}
