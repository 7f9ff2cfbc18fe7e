//! Resolves an engine identifier to a loaded [`PluginInstance`].

use crate::builtin::{BuiltinKind, BuiltinSynth, BUILTIN_PREFIX};
use crate::error::{LoadStage, PluginError, Result};
use crate::instance::PluginInstance;
use std::path::{Path, PathBuf};

/// Sample rate and block size every instance is prepared with right after
/// loading. The render pipeline reconfigures per request.
pub const INITIAL_SAMPLE_RATE: f64 = 44100.0;
pub const INITIAL_BLOCK_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    Builtin(BuiltinKind),
    Vst2(PathBuf),
}

impl PluginSource {
    /// `builtin:<name>` selects a built-in engine; anything else is a plugin file.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(PluginError::load_failed(
                "",
                LoadStage::Scanning,
                "empty plugin identifier",
            ));
        }
        match identifier.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => Ok(PluginSource::Builtin(BuiltinKind::from_name(name)?)),
            None => Ok(PluginSource::Vst2(resolve_relative_path(identifier))),
        }
    }
}

/// Relative plugin paths are resolved against the working directory.
fn resolve_relative_path(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load and initialize an engine.
pub fn load_plugin(identifier: &str, variant: i32) -> Result<Box<dyn PluginInstance>> {
    let mut instance: Box<dyn PluginInstance> = match PluginSource::parse(identifier)? {
        PluginSource::Builtin(kind) => Box::new(BuiltinSynth::new(kind)),
        PluginSource::Vst2(path) => load_vst2(&path, variant)?,
    };

    // Force initialization on the loading thread.
    instance.configure(INITIAL_SAMPLE_RATE, INITIAL_BLOCK_SIZE);

    tracing::info!(
        "Loaded '{}' ({} parameters, {} programs)",
        instance.metadata().name,
        instance.parameter_count(),
        instance.program_count()
    );

    Ok(instance)
}

#[cfg(feature = "vst2")]
fn load_vst2(path: &Path, variant: i32) -> Result<Box<dyn PluginInstance>> {
    Ok(Box::new(crate::vst2_loader::Vst2Instance::load(path, variant)?))
}

#[cfg(not(feature = "vst2"))]
fn load_vst2(path: &Path, _variant: i32) -> Result<Box<dyn PluginInstance>> {
    Err(PluginError::load_failed(
        path,
        LoadStage::Opening,
        "VST2 support not compiled (enable 'vst2' feature)",
    ))
}
