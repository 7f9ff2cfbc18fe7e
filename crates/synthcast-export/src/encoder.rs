//! Block-streaming encoder interface.
//!
//! The render pipeline pushes one block of per-channel samples at a time and
//! collects the finished container bytes at the end.

use crate::error::{ExportError, Result};
use crate::options::{ContainerKind, EncoderOptions};

pub trait BlockEncoder {
    /// Append `frames` frames. `channels` holds one buffer per rendered channel;
    /// if fewer buffers than output channels are supplied, the last one is
    /// repeated.
    fn push_block(&mut self, channels: &[Vec<f32>], frames: usize) -> Result<()>;

    /// Frames pushed so far.
    fn frames_written(&self) -> u64;

    fn content_type(&self) -> &'static str;

    /// Finalizes headers and returns the complete container.
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Creates an encoder for `kind`, or fails with `UnsupportedFormat` when no
/// encoder is available for it.
pub fn encoder_for(kind: &ContainerKind, options: &EncoderOptions) -> Result<Box<dyn BlockEncoder>> {
    options.validate()?;

    match kind {
        #[cfg(feature = "wav")]
        ContainerKind::Wav => Ok(Box::new(crate::format::wav::WavBlockEncoder::new(options)?)),
        #[cfg(not(feature = "wav"))]
        ContainerKind::Wav => Err(ExportError::UnsupportedFormat(
            "WAV support not enabled".into(),
        )),

        #[cfg(feature = "flac")]
        ContainerKind::Flac => Ok(Box::new(crate::format::flac::FlacBlockEncoder::new(options)?)),
        #[cfg(not(feature = "flac"))]
        ContainerKind::Flac => Err(ExportError::UnsupportedFormat(
            "FLAC support not enabled".into(),
        )),

        ContainerKind::Other(ext) => Err(ExportError::UnsupportedFormat(format!(
            "no encoder for '.{}'. Supported: .wav, .flac",
            ext
        ))),
    }
}

/// Checks that `channels` can feed `frames` frames.
pub(crate) fn check_block(channels: &[Vec<f32>], frames: usize) -> Result<()> {
    if channels.is_empty() {
        return Err(ExportError::InvalidData("block has no channels".into()));
    }
    if channels.iter().any(|ch| ch.len() < frames) {
        return Err(ExportError::InvalidData(format!(
            "channel shorter than block of {} frames",
            frames
        )));
    }
    Ok(())
}

/// Source buffer for output channel `ch`.
#[inline]
pub(crate) fn channel_source(channels: &[Vec<f32>], ch: usize) -> &[f32] {
    &channels[ch.min(channels.len() - 1)]
}
