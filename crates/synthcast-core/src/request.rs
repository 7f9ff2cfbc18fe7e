//! Render request descriptor.
//!
//! Field names and defaults match the wire format: a JSON object whose
//! missing fields fall back to the values in `Default`.

use crate::config::RenderLimits;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use synthcast_export::{BitDepth, ContainerKind, EncoderOptions};

/// What a request produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// Parameter and program state as JSON. No audio is rendered.
    Introspection,
    /// Rendered audio in the given container.
    Audio(ContainerKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderRequest {
    /// Program to select; negative means "no change".
    pub preset_number: i64,
    pub list_parameters: bool,
    pub sample_rate: u32,
    pub block_size: u32,
    pub bit_depth: u32,
    pub n_channels: u16,
    pub render_seconds: f64,
    /// 1-based, as MIDI is usually written.
    pub midi_channel: u8,
    pub midi_pitch: u8,
    pub midi_velocity: u8,
    /// Offset of the note-off from the start of the render.
    pub note_seconds: f64,
    /// Overrides by parameter display name (case-sensitive).
    pub parameters: BTreeMap<String, f32>,
    /// Overrides by parameter index, written as a decimal string.
    pub indexed_parameters: BTreeMap<String, f32>,
    /// Chosen from the requested resource, never from the payload.
    #[serde(skip)]
    pub container: ContainerKind,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            preset_number: -1,
            list_parameters: false,
            sample_rate: 44100,
            block_size: 2056,
            bit_depth: 16,
            n_channels: 2,
            render_seconds: 1.5,
            midi_channel: 1,
            midi_pitch: 60,
            midi_velocity: 120,
            note_seconds: 0.75,
            parameters: BTreeMap::new(),
            indexed_parameters: BTreeMap::new(),
            container: ContainerKind::Wav,
        }
    }
}

impl RenderRequest {
    /// Parses a JSON payload. Empty or malformed input yields `None`.
    pub fn from_json(payload: &str) -> Option<Self> {
        let payload = payload.trim();
        if payload.is_empty() {
            return None;
        }
        match serde_json::from_str(payload) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparsable request payload");
                None
            }
        }
    }

    pub fn response_kind(&self) -> ResponseKind {
        if self.list_parameters {
            ResponseKind::Introspection
        } else {
            ResponseKind::Audio(self.container.clone())
        }
    }

    /// The program to select, if any.
    pub fn program(&self) -> Option<usize> {
        usize::try_from(self.preset_number).ok()
    }

    pub fn frames_per_block(&self) -> usize {
        self.block_size as usize
    }

    /// `floor(renderSeconds * sampleRate / blockSize)`. A trailing partial
    /// block is not rendered.
    pub fn block_count(&self) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        (self.render_seconds * self.sample_rate as f64 / self.block_size as f64).floor() as usize
    }

    /// Absolute sample position of the note-off.
    pub fn note_off_frame(&self) -> usize {
        (self.note_seconds * self.sample_rate as f64).floor() as usize
    }

    /// 0-based MIDI channel.
    pub fn channel_index(&self) -> u8 {
        self.midi_channel.saturating_sub(1)
    }

    pub fn encoder_options(&self) -> Result<EncoderOptions> {
        Ok(EncoderOptions {
            sample_rate: self.sample_rate,
            channels: self.n_channels,
            bit_depth: BitDepth::from_bits(self.bit_depth)?,
        })
    }

    /// Rendered frames times channels.
    pub fn total_samples(&self) -> u64 {
        (self.block_count() as u64)
            .saturating_mul(self.block_size as u64)
            .saturating_mul(self.n_channels as u64)
    }

    /// Checks the fields an audio render depends on against `limits`.
    /// Introspection requests only read the parameter maps and the preset,
    /// so they always pass.
    pub fn validate(&self, limits: &RenderLimits) -> Result<()> {
        if self.list_parameters {
            return Ok(());
        }

        if self.sample_rate == 0 || self.sample_rate > limits.max_sample_rate {
            return Err(invalid(format!(
                "sampleRate {} outside 1..={}",
                self.sample_rate, limits.max_sample_rate
            )));
        }
        if self.block_size == 0 || self.block_size > limits.max_block_size {
            return Err(invalid(format!(
                "blockSize {} outside 1..={}",
                self.block_size, limits.max_block_size
            )));
        }
        if self.n_channels == 0 || self.n_channels > limits.max_channels {
            return Err(invalid(format!(
                "nChannels {} outside 1..={}",
                self.n_channels, limits.max_channels
            )));
        }
        if !(1..=16).contains(&self.midi_channel) {
            return Err(invalid(format!(
                "midiChannel {} outside 1..=16",
                self.midi_channel
            )));
        }
        if self.midi_pitch > 127 || self.midi_velocity > 127 {
            return Err(invalid("midiPitch and midiVelocity must be <= 127"));
        }
        if !self.note_seconds.is_finite() || self.note_seconds < 0.0 {
            return Err(invalid("noteSeconds must be a non-negative number"));
        }
        if !self.render_seconds.is_finite() || self.render_seconds < 0.0 {
            return Err(invalid("renderSeconds must be a non-negative number"));
        }
        if self.render_seconds > limits.max_render_seconds {
            return Err(invalid(format!(
                "renderSeconds {} exceeds limit of {}",
                self.render_seconds, limits.max_render_seconds
            )));
        }
        if self.total_samples() > limits.max_total_samples {
            return Err(invalid(format!(
                "render of {} samples exceeds limit of {}",
                self.total_samples(),
                limits.max_total_samples
            )));
        }

        BitDepth::from_bits(self.bit_depth)?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidRequest(msg.into())
}
