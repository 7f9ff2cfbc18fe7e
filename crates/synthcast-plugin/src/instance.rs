//! Plugin instance trait and processing types.
//!
//! One `PluginInstance` is one loaded synthesizer. Implementations are not
//! reentrant: every call mutates engine state, so callers serialize access.

use crate::midi::MidiEvent;
use crate::PluginMetadata;

#[derive(Default)]
pub struct ProcessContext<'a> {
    /// Events whose `frame_offset` lies inside the block being processed.
    pub midi_events: &'a [MidiEvent],
}

impl<'a> ProcessContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn midi(mut self, events: &'a [MidiEvent]) -> Self {
        self.midi_events = events;
        self
    }
}

/// Unified interface for built-in and hosted synthesizer engines.
pub trait PluginInstance: Send {
    fn metadata(&self) -> &PluginMetadata;

    /// Clears transient state (voices, envelopes, delay lines). Parameters and
    /// the current program are left alone.
    fn reset(&mut self);

    fn program_count(&self) -> usize;

    fn current_program(&self) -> usize;

    /// Indices outside `0..program_count()` are ignored.
    fn set_program(&mut self, index: usize);

    fn program_name(&self, index: usize) -> String;

    fn parameter_count(&self) -> usize;

    /// Display name. Not guaranteed unique; the index is authoritative.
    fn parameter_name(&self, index: usize) -> String;

    /// Normalized 0..1.
    fn get_parameter(&self, index: usize) -> f32;

    /// Normalized 0..1. Out-of-range indices are ignored.
    fn set_parameter(&mut self, index: usize, value: f32);

    fn configure(&mut self, sample_rate: f64, block_size: usize);

    /// Renders `outputs[ch].len()` frames into every output channel, overwriting
    /// whatever the buffers held.
    fn process(&mut self, outputs: &mut [Vec<f32>], ctx: &ProcessContext);

    /// Current value of every parameter, in index order.
    fn parameter_values(&self) -> Vec<f32> {
        (0..self.parameter_count())
            .map(|i| self.get_parameter(i))
            .collect()
    }
}
