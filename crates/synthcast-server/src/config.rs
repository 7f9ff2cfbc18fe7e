//! Server configuration from the command line and environment.

use clap::Parser;
use std::time::Duration;
use synthcast_core::{HostConfig, RenderLimits};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 1 << 20,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Every flag can also be set through its `SYNTHCAST_*` environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "synthcast-server", version, about = "Render synthesizer clips over HTTP")]
pub struct Cli {
    /// Plugin file to host, or `builtin:<name>`
    #[arg(long, env = "SYNTHCAST_PLUGIN", default_value = "builtin:poly")]
    pub plugin: String,

    /// Variant selector passed to the plugin loader (VST2 shell id)
    #[arg(long, env = "SYNTHCAST_VARIANT", default_value_t = 0, allow_negative_numbers = true)]
    pub variant: i32,

    #[arg(long, env = "SYNTHCAST_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "SYNTHCAST_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Pooled engine instances; 0 loads a fresh engine per request
    #[arg(long, env = "SYNTHCAST_POOL_SIZE", default_value_t = 1)]
    pub pool_size: usize,

    #[arg(long, env = "SYNTHCAST_ACQUIRE_TIMEOUT_MS", default_value_t = 5000)]
    pub acquire_timeout_ms: u64,

    #[arg(long, env = "SYNTHCAST_BACKOFF_MS", default_value_t = 10)]
    pub backoff_ms: u64,

    /// Don't capture and restore the engine's startup parameter values
    #[arg(long, env = "SYNTHCAST_NO_DEFAULT_CAPTURE")]
    pub no_default_capture: bool,

    #[arg(long, env = "SYNTHCAST_MAX_RENDER_SECONDS", default_value_t = 30.0)]
    pub max_render_seconds: f64,

    #[arg(long, env = "SYNTHCAST_MAX_SAMPLE_RATE", default_value_t = 192_000)]
    pub max_sample_rate: u32,

    #[arg(long, env = "SYNTHCAST_MAX_BLOCK_SIZE", default_value_t = 65_536)]
    pub max_block_size: u32,

    #[arg(long, env = "SYNTHCAST_MAX_CHANNELS", default_value_t = 32)]
    pub max_channels: u16,

    /// Largest render accepted, counted as frames times channels
    #[arg(long, env = "SYNTHCAST_MAX_TOTAL_SAMPLES", default_value_t = 32 * 1024 * 1024)]
    pub max_total_samples: u64,

    #[arg(long, env = "SYNTHCAST_MAX_BODY_BYTES", default_value_t = 1 << 20)]
    pub max_body_bytes: usize,
}

impl Cli {
    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            plugin: self.plugin.clone(),
            variant: self.variant,
            pool_size: self.pool_size,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            backoff: Duration::from_millis(self.backoff_ms),
            capture_defaults: !self.no_default_capture,
            limits: RenderLimits {
                max_render_seconds: self.max_render_seconds,
                max_sample_rate: self.max_sample_rate,
                max_block_size: self.max_block_size,
                max_channels: self.max_channels,
                max_total_samples: self.max_total_samples,
            },
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_body_bytes: self.max_body_bytes,
        }
    }
}
