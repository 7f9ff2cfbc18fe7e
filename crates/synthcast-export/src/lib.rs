//! # synthcast export
//!
//! Container encoders for rendered audio. Encoders accept audio one block at
//! a time, so a render never has to hold its whole output as floats.
//!
//! ```ignore
//! use synthcast_export::{encoder_for, BitDepth, ContainerKind, EncoderOptions};
//!
//! let options = EncoderOptions { sample_rate: 44100, channels: 2, bit_depth: BitDepth::Int16 };
//! let mut encoder = encoder_for(&ContainerKind::Wav, &options)?;
//! encoder.push_block(&block, 512)?;
//! let wav_bytes = encoder.finish()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default): WAV export via hound (pure Rust)
//! - `flac` (default): FLAC export via flacenc (pure Rust)

pub mod encoder;
pub mod error;
pub mod format;
mod options;

pub use encoder::{encoder_for, BlockEncoder};
pub use error::{ExportError, Result};
pub use options::{BitDepth, ContainerKind, EncoderOptions};

#[cfg(feature = "wav")]
pub use format::wav::WavBlockEncoder;

#[cfg(feature = "flac")]
pub use format::flac::FlacBlockEncoder;
