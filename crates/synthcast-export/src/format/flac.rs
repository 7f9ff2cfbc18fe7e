//! FLAC format encoder using flacenc
//!
//! flacenc works on a complete sample source, so blocks are converted to
//! integers as they arrive and encoded in one pass on `finish`.

use crate::encoder::{channel_source, check_block, BlockEncoder};
use crate::error::{ExportError, Result};
use crate::format::quantize;
use crate::options::{BitDepth, ContainerKind, EncoderOptions};
use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config::Encoder as EncoderConfig;
use flacenc::encode_with_fixed_block_size;
use flacenc::error::Verify;
use flacenc::source::MemSource;

/// Samples per FLAC frame
const FLAC_BLOCK_SIZE: usize = 4096;

/// Stream limits flacenc enforces when the config is verified.
pub const FLAC_MAX_CHANNELS: u16 = 8;
pub const FLAC_MAX_SAMPLE_RATE: u32 = 96_000;

pub struct FlacBlockEncoder {
    options: EncoderOptions,
    interleaved: Vec<i32>,
    frames_written: u64,
}

impl FlacBlockEncoder {
    pub fn new(options: &EncoderOptions) -> Result<Self> {
        match options.bit_depth {
            BitDepth::Int16 | BitDepth::Int24 => {}
            other => {
                return Err(ExportError::UnsupportedFormat(format!(
                    "FLAC supports 16-bit or 24-bit, not {}-bit",
                    other.bits()
                )))
            }
        }
        if options.channels > FLAC_MAX_CHANNELS {
            return Err(ExportError::UnsupportedFormat(format!(
                "FLAC supports up to {} channels, not {}",
                FLAC_MAX_CHANNELS, options.channels
            )));
        }
        if options.sample_rate > FLAC_MAX_SAMPLE_RATE {
            return Err(ExportError::UnsupportedFormat(format!(
                "FLAC supports sample rates up to {} Hz, not {}",
                FLAC_MAX_SAMPLE_RATE, options.sample_rate
            )));
        }
        Ok(Self {
            options: options.clone(),
            interleaved: Vec::new(),
            frames_written: 0,
        })
    }

    #[inline]
    fn to_int(&self, sample: f32) -> i32 {
        quantize(sample, self.options.bit_depth.bits())
    }
}

impl BlockEncoder for FlacBlockEncoder {
    fn push_block(&mut self, channels: &[Vec<f32>], frames: usize) -> Result<()> {
        check_block(channels, frames)?;
        let num_channels = self.options.channels as usize;
        self.interleaved.reserve(frames * num_channels);

        for frame in 0..frames {
            for ch in 0..num_channels {
                let sample = self.to_int(channel_source(channels, ch)[frame]);
                self.interleaved.push(sample);
            }
        }

        self.frames_written += frames as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn content_type(&self) -> &'static str {
        ContainerKind::Flac.content_type()
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let encoder_config = EncoderConfig::default()
            .into_verified()
            .map_err(|e| ExportError::Encoding(format!("Invalid FLAC config: {:?}", e)))?;

        let source = MemSource::from_samples(
            &self.interleaved,
            self.options.channels as usize,
            self.options.bit_depth.bits() as usize,
            self.options.sample_rate as usize,
        );

        let stream = encode_with_fixed_block_size(&encoder_config, source, FLAC_BLOCK_SIZE)
            .map_err(|e| ExportError::Encoding(format!("FLAC encoding failed: {:?}", e)))?;

        let mut sink = ByteSink::new();
        stream
            .write(&mut sink)
            .map_err(|e| ExportError::Encoding(format!("Failed to write FLAC stream: {:?}", e)))?;

        let bytes = sink.into_inner();
        tracing::debug!(
            "Encoded {} FLAC frames into {} bytes",
            self.frames_written,
            bytes.len()
        );

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(bit_depth: BitDepth) -> EncoderOptions {
        EncoderOptions {
            sample_rate: 44100,
            channels: 2,
            bit_depth,
        }
    }

    #[test]
    fn test_flac_rejects_32bit_float() {
        assert!(matches!(
            FlacBlockEncoder::new(&options(BitDepth::Float32)),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_flac_rejects_more_than_eight_channels() {
        let nine = EncoderOptions {
            channels: 9,
            ..options(BitDepth::Int16)
        };
        assert!(matches!(
            FlacBlockEncoder::new(&nine),
            Err(ExportError::UnsupportedFormat(_))
        ));

        let eight = EncoderOptions {
            channels: 8,
            ..options(BitDepth::Int16)
        };
        assert!(FlacBlockEncoder::new(&eight).is_ok());
    }

    #[test]
    fn test_flac_rejects_high_sample_rates() {
        let fast = EncoderOptions {
            sample_rate: 192_000,
            ..options(BitDepth::Int24)
        };
        assert!(matches!(
            FlacBlockEncoder::new(&fast),
            Err(ExportError::UnsupportedFormat(_))
        ));

        let max = EncoderOptions {
            sample_rate: FLAC_MAX_SAMPLE_RATE,
            ..options(BitDepth::Int24)
        };
        assert!(FlacBlockEncoder::new(&max).is_ok());
    }

    #[test]
    fn test_interleaves_blocks() {
        let mut encoder = FlacBlockEncoder::new(&options(BitDepth::Int16)).unwrap();
        encoder
            .push_block(&[vec![0.0, 1.0], vec![0.5, -0.5]], 2)
            .unwrap();

        assert_eq!(encoder.interleaved, vec![0, 16383, 32767, -16383]);
        assert_eq!(encoder.frames_written(), 2);
    }

    #[test]
    fn test_finish_produces_flac_stream() {
        let mut encoder = Box::new(FlacBlockEncoder::new(&options(BitDepth::Int16)).unwrap());
        let block: Vec<Vec<f32>> = vec![(0..4096).map(|i| (i as f32 / 64.0).sin() * 0.5).collect(); 2];
        encoder.push_block(&block, 4096).unwrap();

        let bytes = encoder.finish().unwrap();
        assert_eq!(&bytes[0..4], b"fLaC");
    }
}
