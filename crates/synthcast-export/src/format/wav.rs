//! WAV format encoder using hound
//!
//! Samples are written as each block arrives; `finish` patches the RIFF
//! header lengths and hands back the container bytes.

use crate::encoder::{channel_source, check_block, BlockEncoder};
use crate::error::Result;
use crate::format::quantize;
use crate::options::{BitDepth, ContainerKind, EncoderOptions};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::cell::RefCell;
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::rc::Rc;

/// In-memory sink that stays readable after the writer owning a handle to it
/// has been finalized and dropped.
#[derive(Clone, Default)]
struct SharedCursor(Rc<RefCell<Cursor<Vec<u8>>>>);

impl SharedCursor {
    fn take(&self) -> Vec<u8> {
        std::mem::take(self.0.borrow_mut().get_mut())
    }
}

impl Write for SharedCursor {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

impl Seek for SharedCursor {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.0.borrow_mut().seek(pos)
    }
}

/// Create hound WavSpec from our options
fn create_wav_spec(options: &EncoderOptions) -> WavSpec {
    let sample_format = match options.bit_depth {
        BitDepth::Float32 => SampleFormat::Float,
        _ => SampleFormat::Int,
    };

    WavSpec {
        channels: options.channels,
        sample_rate: options.sample_rate,
        bits_per_sample: options.bit_depth.bits(),
        sample_format,
    }
}

pub struct WavBlockEncoder {
    writer: WavWriter<SharedCursor>,
    sink: SharedCursor,
    options: EncoderOptions,
    frames_written: u64,
}

impl WavBlockEncoder {
    pub fn new(options: &EncoderOptions) -> Result<Self> {
        let sink = SharedCursor::default();
        let writer = WavWriter::new(sink.clone(), create_wav_spec(options))?;
        Ok(Self {
            writer,
            sink,
            options: options.clone(),
            frames_written: 0,
        })
    }
}

impl BlockEncoder for WavBlockEncoder {
    fn push_block(&mut self, channels: &[Vec<f32>], frames: usize) -> Result<()> {
        check_block(channels, frames)?;
        let num_channels = self.options.channels as usize;

        for frame in 0..frames {
            for ch in 0..num_channels {
                let sample = channel_source(channels, ch)[frame];
                match self.options.bit_depth {
                    BitDepth::Int8 => self.writer.write_sample(quantize(sample, 8) as i8)?,
                    BitDepth::Int16 => self.writer.write_sample(quantize(sample, 16) as i16)?,
                    BitDepth::Int24 => self.writer.write_sample(quantize(sample, 24))?,
                    BitDepth::Float32 => self.writer.write_sample(sample)?,
                }
            }
        }

        self.frames_written += frames as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn content_type(&self) -> &'static str {
        ContainerKind::Wav.content_type()
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let WavBlockEncoder { writer, sink, .. } = *self;
        writer.finalize()?;
        Ok(sink.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(bit_depth: BitDepth, channels: u16) -> EncoderOptions {
        EncoderOptions {
            sample_rate: 44100,
            channels,
            bit_depth,
        }
    }

    #[test]
    fn test_header_and_exact_length() {
        let mut encoder = Box::new(WavBlockEncoder::new(&options(BitDepth::Int16, 2)).unwrap());
        let block = vec![vec![0.0, 0.5, -0.5], vec![0.1, -0.1, 0.0]];
        encoder.push_block(&block, 3).unwrap();
        assert_eq!(encoder.frames_written(), 3);

        let bytes = encoder.finish().unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte canonical header + 3 frames * 2 channels * 2 bytes
        assert_eq!(bytes.len(), 44 + 12);
    }

    #[test]
    fn test_blocks_stream_in_order() {
        let mut encoder = Box::new(WavBlockEncoder::new(&options(BitDepth::Float32, 1)).unwrap());
        encoder.push_block(&[vec![0.25, 0.5]], 2).unwrap();
        encoder.push_block(&[vec![0.75]], 1).unwrap();
        let bytes = encoder.finish().unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_mono_source_feeds_stereo_output() {
        let mut encoder = Box::new(WavBlockEncoder::new(&options(BitDepth::Int16, 2)).unwrap());
        encoder.push_block(&[vec![1.0]], 1).unwrap();
        let bytes = encoder.finish().unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, 32767]);
    }

    #[test]
    fn test_24_bit_spec() {
        let mut encoder = Box::new(WavBlockEncoder::new(&options(BitDepth::Int24, 1)).unwrap());
        encoder.push_block(&[vec![0.0; 10]], 10).unwrap();
        let bytes = encoder.finish().unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
        assert_eq!(reader.len(), 10);
    }

    #[test]
    fn test_short_channel_rejected() {
        let mut encoder = WavBlockEncoder::new(&options(BitDepth::Int16, 1)).unwrap();
        assert!(encoder.push_block(&[vec![0.0; 2]], 4).is_err());
    }
}
