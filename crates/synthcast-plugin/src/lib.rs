//! Synthesizer engines for synthcast
//!
//! An engine is one loaded synthesizer instance: a fixed bank of normalized
//! parameters, a bank of programs (presets), and a block renderer driven by
//! MIDI events. Engines are stateful and not reentrant; `synthcast-core`
//! serializes access to them.
//!
//! ## Usage
//!
//! ```ignore
//! use synthcast_plugin::{load_plugin, MidiEvent, ProcessContext};
//!
//! let mut synth = load_plugin("builtin:poly", 0)?;
//! synth.configure(44100.0, 512);
//! synth.set_program(1);
//!
//! let events = [MidiEvent::note_on(0, 0, 60, 120)];
//! let mut outputs = vec![vec![0.0f32; 512]; 2];
//! synth.process(&mut outputs, &ProcessContext::new().midi(&events));
//! ```
//!
//! ## Feature Flags
//!
//! - `vst2`: host VST2 plugins through the `vst` crate

pub mod error;
pub use error::{LoadStage, PluginError, Result};

mod metadata;
pub use metadata::{AudioIO, PluginMetadata};

pub mod instance;
pub use instance::{PluginInstance, ProcessContext};

pub mod midi;
pub use midi::{MidiEvent, MidiEventVec, MidiMessage};

pub mod builtin;
pub use builtin::{BuiltinKind, BuiltinSynth};

mod loader;
pub use loader::{load_plugin, PluginSource, INITIAL_BLOCK_SIZE, INITIAL_SAMPLE_RATE};

#[cfg(feature = "vst2")]
pub mod vst2_loader;
