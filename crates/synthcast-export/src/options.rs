//! Encoder options.

use crate::error::{ExportError, Result};

/// Output container, chosen from the requested resource's suffix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContainerKind {
    #[default]
    Wav,
    Flac,
    /// Anything without an encoder. Kept so the failure can name it.
    Other(String),
}

impl ContainerKind {
    /// Maps a file extension (with or without the dot, any case).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "wav" | "wave" => ContainerKind::Wav,
            "flac" => ContainerKind::Flac,
            _ => ContainerKind::Other(ext),
        }
    }

    /// File extension (without dot).
    pub fn extension(&self) -> &str {
        match self {
            ContainerKind::Wav => "wav",
            ContainerKind::Flac => "flac",
            ContainerKind::Other(ext) => ext,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ContainerKind::Wav => "audio/x-wave",
            ContainerKind::Flac => "audio/flac",
            ContainerKind::Other(_) => "application/octet-stream",
        }
    }
}

/// Bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    Int8,
    #[default]
    Int16,
    Int24,
    Float32,
}

impl BitDepth {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Int8),
            16 => Ok(BitDepth::Int16),
            24 => Ok(BitDepth::Int24),
            32 => Ok(BitDepth::Float32),
            other => Err(ExportError::InvalidOptions(format!(
                "bit depth {} (supported: 8, 16, 24, 32)",
                other
            ))),
        }
    }

    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int8 => 8,
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: BitDepth,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bit_depth: BitDepth::Int16,
        }
    }
}

impl EncoderOptions {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ExportError::InvalidOptions("sample rate must be > 0".into()));
        }
        if self.channels == 0 {
            return Err(ExportError::InvalidOptions("channel count must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_extension() {
        assert_eq!(ContainerKind::from_extension("wav"), ContainerKind::Wav);
        assert_eq!(ContainerKind::from_extension(".WAV"), ContainerKind::Wav);
        assert_eq!(ContainerKind::from_extension("flac"), ContainerKind::Flac);
        assert_eq!(
            ContainerKind::from_extension("mp3"),
            ContainerKind::Other("mp3".into())
        );
    }

    #[test]
    fn test_bit_depth_from_bits() {
        assert_eq!(BitDepth::from_bits(16).unwrap(), BitDepth::Int16);
        assert_eq!(BitDepth::from_bits(32).unwrap().bits(), 32);
        assert!(BitDepth::from_bits(12).is_err());
    }

    #[test]
    fn test_options_validate() {
        assert!(EncoderOptions::default().validate().is_ok());
        let bad = EncoderOptions {
            channels: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
