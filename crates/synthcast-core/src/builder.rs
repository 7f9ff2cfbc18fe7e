//! Builder for configuring and constructing a `RenderHost`.

use crate::config::{HostConfig, RenderLimits};
use crate::host::RenderHost;
use crate::pool::PluginFactory;
use crate::Result;
use std::time::Duration;

/// Starts from `HostConfig::default()`. Without `.factory()`, engines are
/// loaded from `.plugin()` and `.variant()`.
#[derive(Default)]
pub struct RenderHostBuilder {
    config: HostConfig,
    factory: Option<PluginFactory>,
}

impl RenderHostBuilder {
    /// Plugin file path or `builtin:<name>`. Default: `builtin:poly`
    pub fn plugin(mut self, identifier: impl Into<String>) -> Self {
        self.config.plugin = identifier.into();
        self
    }

    /// Default: 0
    pub fn variant(mut self, variant: i32) -> Self {
        self.config.variant = variant;
        self
    }

    /// 0 builds a fresh engine per request. Default: 1
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Default: 5s
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    /// Default: 10ms
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Default: true
    pub fn capture_defaults(mut self, capture: bool) -> Self {
        self.config.capture_defaults = capture;
        self
    }

    /// Default: 30
    pub fn max_render_seconds(mut self, seconds: f64) -> Self {
        self.config.limits.max_render_seconds = seconds;
        self
    }

    /// Replaces every render limit at once.
    pub fn limits(mut self, limits: RenderLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Supply engines directly instead of loading `plugin`.
    pub fn factory(mut self, factory: PluginFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn build(self) -> Result<RenderHost> {
        match self.factory {
            Some(factory) => RenderHost::with_factory(self.config, factory),
            None => RenderHost::new(self.config),
        }
    }
}

impl From<HostConfig> for RenderHostBuilder {
    fn from(config: HostConfig) -> Self {
        Self {
            config,
            factory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use synthcast_plugin::{BuiltinKind, BuiltinSynth, PluginInstance};

    #[test]
    fn test_builder_sets_config() {
        let builder = RenderHost::builder()
            .plugin("builtin:poly")
            .variant(4)
            .pool_size(3)
            .acquire_timeout(Duration::from_millis(250))
            .backoff(Duration::from_millis(2))
            .capture_defaults(false)
            .max_render_seconds(5.0);

        let config = builder.config();
        assert_eq!(config.variant, 4);
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.backoff, Duration::from_millis(2));
        assert!(!config.capture_defaults);
        assert_eq!(config.limits.max_render_seconds, 5.0);
    }

    #[test]
    fn test_factory_fills_every_slot() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let factory: PluginFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(BuiltinSynth::new(BuiltinKind::Poly)) as Box<dyn PluginInstance>)
        });

        let host = RenderHost::builder()
            .pool_size(4)
            .factory(factory)
            .build()
            .unwrap();

        assert_eq!(host.pool().len(), 4);
        assert_eq!(loads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = RenderHost::builder().backoff(Duration::ZERO).build();
        assert!(result.is_err());
    }
}
