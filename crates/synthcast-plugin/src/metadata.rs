//! Plugin metadata
//!
//! Identifies a loaded engine and reports the shape of its parameter and program banks.

/// Audio I/O configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioIO {
    /// Number of audio input channels
    pub inputs: usize,
    /// Number of audio output channels
    pub outputs: usize,
}

impl AudioIO {
    /// No inputs, stereo out
    pub fn instrument() -> Self {
        Self {
            inputs: 0,
            outputs: 2,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PluginMetadata {
    /// Identifier the engine was loaded from (file path or `builtin:<name>`)
    pub id: String,

    /// Numeric variant selector (shell plugin id, 0 = first/only)
    pub variant: i32,

    /// Human-readable name
    pub name: String,

    /// Vendor/author name
    pub vendor: String,

    /// Version string
    pub version: String,

    pub audio_io: AudioIO,

    /// Fixed once loaded
    pub parameter_count: usize,

    /// Fixed once loaded
    pub program_count: usize,
}

impl PluginMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: 0,
            name: name.into(),
            vendor: String::new(),
            version: "1.0.0".to_string(),
            audio_io: AudioIO::instrument(),
            parameter_count: 0,
            program_count: 0,
        }
    }

    pub fn variant(mut self, variant: i32) -> Self {
        self.variant = variant;
        self
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn audio_io(mut self, inputs: usize, outputs: usize) -> Self {
        self.audio_io = AudioIO { inputs, outputs };
        self
    }

    pub fn banks(mut self, parameter_count: usize, program_count: usize) -> Self {
        self.parameter_count = parameter_count;
        self.program_count = program_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let meta = PluginMetadata::new("builtin:poly", "Poly")
            .vendor("synthcast")
            .variant(3)
            .audio_io(0, 2)
            .banks(8, 5);

        assert_eq!(meta.id, "builtin:poly");
        assert_eq!(meta.variant, 3);
        assert_eq!(meta.vendor, "synthcast");
        assert_eq!(meta.audio_io, AudioIO::instrument());
        assert_eq!(meta.parameter_count, 8);
        assert_eq!(meta.program_count, 5);
    }
}
