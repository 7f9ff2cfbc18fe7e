//! Render host: the engine pool plus the policy for using it.

use crate::builder::RenderHostBuilder;
use crate::config::HostConfig;
use crate::pipeline::{prepare_encoder, RenderOutput, RenderPipeline};
use crate::pool::{InstancePool, PluginFactory};
use crate::request::RenderRequest;
use crate::Result;
use std::sync::Arc;
use synthcast_plugin::{load_plugin, PluginInstance};

/// Shared by every request handler; all methods take `&self`.
///
/// ```ignore
/// let host = RenderHost::builder()
///     .plugin("builtin:poly")
///     .pool_size(2)
///     .build()?;
///
/// let output = host.render(&RenderRequest::default())?;
/// ```
pub struct RenderHost {
    config: HostConfig,
    pool: InstancePool,
    defaults: Option<Vec<f32>>,
}

impl RenderHost {
    pub fn builder() -> RenderHostBuilder {
        RenderHostBuilder::default()
    }

    /// Loads engines with `load_plugin(config.plugin, config.variant)`.
    pub fn new(config: HostConfig) -> Result<Self> {
        let plugin = config.plugin.clone();
        let variant = config.variant;
        let factory: PluginFactory = Arc::new(move || load_plugin(&plugin, variant));
        Self::with_factory(config, factory)
    }

    /// Builds the pool from `factory`. In pooled mode every slot is loaded
    /// now; in unpooled mode one probe engine is loaded so a broken plugin
    /// still fails at startup.
    pub fn with_factory(config: HostConfig, factory: PluginFactory) -> Result<Self> {
        config.validate()?;

        let (pool, defaults) = if config.is_unpooled() {
            let probe = factory()?;
            let defaults = config.capture_defaults.then(|| probe.parameter_values());
            (InstancePool::unpooled(factory), defaults)
        } else {
            let pool = InstancePool::pooled(&factory, config.pool_size)?;
            let defaults = if config.capture_defaults {
                pool.slots().first().map(|slot| slot.lock().parameter_values())
            } else {
                None
            };
            (pool, defaults)
        };

        tracing::info!(
            plugin = %config.plugin,
            variant = config.variant,
            slots = pool.len(),
            unpooled = pool.is_unpooled(),
            defaults = defaults.as_ref().map_or(0, Vec::len),
            "Render host ready"
        );

        Ok(Self {
            config,
            pool,
            defaults,
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn pool(&self) -> &InstancePool {
        &self.pool
    }

    /// Parameter values restored before every request, if captured.
    pub fn defaults(&self) -> Option<&[f32]> {
        self.defaults.as_deref()
    }

    /// Validates the request, checks the output format, waits for an engine
    /// and runs the pipeline on it. Blocks the calling thread for at most the
    /// acquire timeout plus the render itself.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderOutput> {
        request.validate(&self.config.limits)?;
        let encoder = prepare_encoder(request)?;

        let mut lease = self
            .pool
            .acquire(self.config.acquire_timeout, self.config.backoff)?;
        tracing::debug!(slot = ?lease.slot(), kind = ?request.response_kind(), "Engine acquired");

        RenderPipeline::new(self.defaults()).run_with_encoder(&mut *lease, request, encoder)
    }
}

impl std::fmt::Debug for RenderHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHost")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish()
    }
}
