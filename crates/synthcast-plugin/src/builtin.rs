//! Built-in polyphonic synthesizer.
//!
//! A small subtractive synth that behaves like a hosted instrument plugin:
//! a fixed parameter bank with display names, a factory program bank, and
//! MIDI-driven voices. Output is fully deterministic for a given parameter
//! state and event script once `reset()` has been called.

use crate::instance::{PluginInstance, ProcessContext};
use crate::midi::{MidiEvent, MidiMessage};
use crate::{PluginError, PluginMetadata, Result};
use std::f32::consts::TAU;

pub const BUILTIN_PREFIX: &str = "builtin:";

const MAX_VOICES: usize = 16;
const NOISE_SEED: u32 = 0x1234_5678;

pub const PARAM_VOLUME: usize = 0;
pub const PARAM_WAVEFORM: usize = 1;
pub const PARAM_CUTOFF: usize = 2;
pub const PARAM_ATTACK: usize = 3;
pub const PARAM_DECAY: usize = 4;
pub const PARAM_SUSTAIN: usize = 5;
pub const PARAM_RELEASE: usize = 6;
pub const PARAM_NOISE: usize = 7;
const NUM_PARAMS: usize = 8;

const PARAM_NAMES: [&str; NUM_PARAMS] = [
    "Volume", "Waveform", "Cutoff", "Attack", "Decay", "Sustain", "Release", "Noise",
];

const DEFAULT_PARAMS: [f32; NUM_PARAMS] = [0.8, 0.0, 0.7, 0.05, 0.3, 0.7, 0.3, 0.0];

struct Program {
    name: &'static str,
    params: [f32; NUM_PARAMS],
}

const PROGRAMS: [Program; 5] = [
    Program {
        name: "Init",
        params: DEFAULT_PARAMS,
    },
    Program {
        name: "Soft Pad",
        params: [0.7, 0.9, 0.45, 0.6, 0.5, 0.8, 0.7, 0.0],
    },
    Program {
        name: "Bright Lead",
        params: [0.75, 0.25, 0.95, 0.01, 0.2, 0.9, 0.15, 0.0],
    },
    Program {
        name: "Pluck",
        params: [0.85, 0.0, 0.6, 0.0, 0.12, 0.0, 0.1, 0.05],
    },
    Program {
        name: "Noise Sweep",
        params: [0.6, 0.5, 0.3, 0.4, 0.6, 0.5, 0.5, 0.8],
    },
];

/// Built-in engines selectable with `builtin:<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Poly,
}

impl BuiltinKind {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "poly" => Ok(BuiltinKind::Poly),
            other => Err(PluginError::UnknownBuiltin(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinKind::Poly => "poly",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum EnvStage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, Default)]
struct Voice {
    note: u8,
    velocity: f32,
    phase: f32,
    stage: EnvStage,
    level: f32,
    release_step: f32,
    lowpass: f32,
}

impl Voice {
    fn is_active(&self) -> bool {
        self.stage != EnvStage::Idle
    }
}

pub struct BuiltinSynth {
    metadata: PluginMetadata,
    params: [f32; NUM_PARAMS],
    program: usize,
    sample_rate: f32,
    block_size: usize,
    voices: [Voice; MAX_VOICES],
    noise_state: u32,
}

impl BuiltinSynth {
    pub fn new(kind: BuiltinKind) -> Self {
        let metadata = PluginMetadata::new(format!("{}{}", BUILTIN_PREFIX, kind.name()), "Poly")
            .vendor("synthcast")
            .audio_io(0, 2)
            .banks(NUM_PARAMS, PROGRAMS.len());

        Self {
            metadata,
            params: DEFAULT_PARAMS,
            program: 0,
            sample_rate: 44100.0,
            block_size: 512,
            voices: [Voice::default(); MAX_VOICES],
            noise_state: NOISE_SEED,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    fn attack_seconds(&self) -> f32 {
        0.001 + self.params[PARAM_ATTACK] * 2.0
    }

    fn decay_seconds(&self) -> f32 {
        0.001 + self.params[PARAM_DECAY] * 2.0
    }

    fn release_seconds(&self) -> f32 {
        0.001 + self.params[PARAM_RELEASE] * 3.0
    }

    /// 20 Hz .. 20 kHz, exponential.
    fn cutoff_hz(&self) -> f32 {
        20.0 * 1000.0f32.powf(self.params[PARAM_CUTOFF])
    }

    fn next_noise(&mut self) -> f32 {
        self.noise_state = self
            .noise_state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        (self.noise_state >> 8) as f32 / (1u32 << 23) as f32 - 1.0
    }

    fn handle_event(&mut self, event: &MidiEvent) {
        match event.msg {
            MidiMessage::NoteOn { note, velocity } if velocity > 0 => self.note_on(note, velocity),
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
                self.release_where(|v| v.note == note)
            }
            MidiMessage::AllNotesOff => self.release_where(|_| true),
            MidiMessage::ControlChange { .. } => {}
        }
    }

    fn note_on(&mut self, note: u8, velocity: u8) {
        let index = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .unwrap_or_else(|| {
                // Steal the quietest voice.
                self.voices
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.level.total_cmp(&b.1.level))
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });

        self.voices[index] = Voice {
            note,
            velocity: velocity as f32 / 127.0,
            stage: EnvStage::Attack,
            ..Voice::default()
        };
    }

    fn release_where(&mut self, pred: impl Fn(&Voice) -> bool) {
        let release_samples = (self.release_seconds() * self.sample_rate).max(1.0);
        for voice in self.voices.iter_mut() {
            if voice.is_active() && voice.stage != EnvStage::Release && pred(voice) {
                voice.stage = EnvStage::Release;
                voice.release_step = voice.level / release_samples;
            }
        }
    }

    fn oscillator(&self, phase: f32) -> f32 {
        let saw = 2.0 * phase - 1.0;
        let square = if phase < 0.5 { 1.0 } else { -1.0 };
        let sine = (TAU * phase).sin();

        let morph = self.params[PARAM_WAVEFORM] * 2.0;
        if morph <= 1.0 {
            saw * (1.0 - morph) + square * morph
        } else {
            square * (2.0 - morph) + sine * (morph - 1.0)
        }
    }

    fn render_frame(&mut self) -> f32 {
        let sr = self.sample_rate;
        let attack_step = 1.0 / (self.attack_seconds() * sr).max(1.0);
        let sustain = self.params[PARAM_SUSTAIN];
        let decay_step = (1.0 - sustain) / (self.decay_seconds() * sr).max(1.0);
        let coeff = 1.0 - (-TAU * self.cutoff_hz() / sr).exp();
        let noise_amount = self.params[PARAM_NOISE];
        let noise = self.next_noise();

        let mut out = 0.0f32;
        for i in 0..MAX_VOICES {
            if !self.voices[i].is_active() {
                continue;
            }
            let osc = self.oscillator(self.voices[i].phase);
            let voice = &mut self.voices[i];

            let raw = osc * (1.0 - noise_amount) + noise * noise_amount;
            voice.lowpass += coeff * (raw - voice.lowpass);
            out += voice.lowpass * voice.level * voice.velocity;

            let freq = 440.0 * 2.0f32.powf((voice.note as f32 - 69.0) / 12.0);
            voice.phase += freq / sr;
            if voice.phase >= 1.0 {
                voice.phase -= voice.phase.floor();
            }

            match voice.stage {
                EnvStage::Attack => {
                    voice.level += attack_step;
                    if voice.level >= 1.0 {
                        voice.level = 1.0;
                        voice.stage = EnvStage::Decay;
                    }
                }
                EnvStage::Decay => {
                    voice.level -= decay_step;
                    if voice.level <= sustain {
                        voice.level = sustain;
                        voice.stage = EnvStage::Sustain;
                    }
                }
                EnvStage::Sustain => voice.level = sustain,
                EnvStage::Release => {
                    voice.level -= voice.release_step;
                    if voice.level <= 0.0 {
                        *voice = Voice::default();
                    }
                }
                EnvStage::Idle => {}
            }
        }

        (out * self.params[PARAM_VOLUME] * 0.5).tanh()
    }
}

impl PluginInstance for BuiltinSynth {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn reset(&mut self) {
        self.voices = [Voice::default(); MAX_VOICES];
        self.noise_state = NOISE_SEED;
    }

    fn program_count(&self) -> usize {
        PROGRAMS.len()
    }

    fn current_program(&self) -> usize {
        self.program
    }

    fn set_program(&mut self, index: usize) {
        if let Some(program) = PROGRAMS.get(index) {
            self.program = index;
            self.params = program.params;
        }
    }

    fn program_name(&self, index: usize) -> String {
        PROGRAMS
            .get(index)
            .map(|p| p.name.to_string())
            .unwrap_or_default()
    }

    fn parameter_count(&self) -> usize {
        NUM_PARAMS
    }

    fn parameter_name(&self, index: usize) -> String {
        PARAM_NAMES
            .get(index)
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    fn get_parameter(&self, index: usize) -> f32 {
        self.params.get(index).copied().unwrap_or(0.0)
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.params.get_mut(index) {
            *slot = value.clamp(0.0, 1.0);
        }
    }

    fn configure(&mut self, sample_rate: f64, block_size: usize) {
        self.sample_rate = sample_rate as f32;
        self.block_size = block_size;
    }

    fn process(&mut self, outputs: &mut [Vec<f32>], ctx: &ProcessContext) {
        let num_samples = outputs.iter().map(Vec::len).min().unwrap_or(0);
        if num_samples == 0 {
            return;
        }

        let mut events: Vec<&MidiEvent> = ctx.midi_events.iter().collect();
        events.sort_by_key(|e| e.frame_offset);
        let mut pending = events.into_iter().peekable();

        for frame in 0..num_samples {
            while let Some(event) =
                pending.next_if(|e| e.frame_offset.min(num_samples - 1) <= frame)
            {
                self.handle_event(event);
            }

            let sample = self.render_frame();
            for channel in outputs.iter_mut() {
                channel[frame] = sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn render(synth: &mut BuiltinSynth, events: &[MidiEvent], frames: usize) -> Vec<f32> {
        let mut outputs = vec![vec![0.0f32; frames]; 2];
        synth.process(&mut outputs, &ProcessContext::new().midi(events));
        outputs.swap_remove(0)
    }

    #[test]
    fn test_banks_are_fixed() {
        let synth = BuiltinSynth::new(BuiltinKind::Poly);
        assert_eq!(synth.parameter_count(), 8);
        assert_eq!(synth.program_count(), 5);
        assert_eq!(synth.metadata().parameter_count, 8);
        assert_eq!(synth.metadata().id, "builtin:poly");
        assert_eq!(synth.parameter_name(PARAM_CUTOFF), "Cutoff");
        assert_eq!(synth.program_name(2), "Bright Lead");
        assert_eq!(synth.program_name(99), "");
    }

    #[test]
    fn test_silence_without_notes() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        let out = render(&mut synth, &[], 256);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_note_on_produces_audio() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        let out = render(&mut synth, &[MidiEvent::note_on(0, 0, 60, 120)], 4096);
        assert!(out.iter().any(|s| s.abs() > 0.01));
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn test_all_notes_off_releases_voices() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        synth.set_parameter(PARAM_RELEASE, 0.0);
        render(
            &mut synth,
            &[
                MidiEvent::note_on(0, 0, 60, 120),
                MidiEvent::note_on(0, 0, 64, 120),
                MidiEvent::all_notes_off(100, 0),
            ],
            512,
        );
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn test_program_change_out_of_range_ignored() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        synth.set_program(3);
        assert_eq!(synth.current_program(), 3);
        synth.set_program(5);
        assert_eq!(synth.current_program(), 3);
        assert_relative_eq!(synth.get_parameter(PARAM_SUSTAIN), 0.0);
    }

    #[test]
    fn test_parameters_clamped_and_bounds_checked() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        synth.set_parameter(PARAM_VOLUME, 3.0);
        assert_relative_eq!(synth.get_parameter(PARAM_VOLUME), 1.0);
        synth.set_parameter(42, 0.5);
        assert_relative_eq!(synth.get_parameter(42), 0.0);
    }

    #[test]
    fn test_reset_restores_determinism() {
        let mut synth = BuiltinSynth::new(BuiltinKind::Poly);
        synth.set_parameter(PARAM_NOISE, 0.5);
        let events = [MidiEvent::note_on(0, 0, 48, 100)];

        synth.reset();
        let first = render(&mut synth, &events, 2048);
        synth.reset();
        let second = render(&mut synth, &events, 2048);

        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(BuiltinKind::from_name("poly").is_ok());
        assert!(matches!(
            BuiltinKind::from_name("organ"),
            Err(PluginError::UnknownBuiltin(_))
        ));
    }
}
