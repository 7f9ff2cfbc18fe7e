//! VST2 plugin loader
//!
//! Hosts a VST2 instrument through the `vst` crate and exposes it as a
//! [`PluginInstance`].

use crate::error::{LoadStage, PluginError, Result};
use crate::instance::{PluginInstance, ProcessContext};
use crate::midi::MidiEvent;
use crate::PluginMetadata;
use std::path::Path;
use std::sync::{Arc, Mutex};
use vst::api;
use vst::buffer::AudioBuffer as VstBuffer;
use vst::host::{Host, PluginLoader};
use vst::plugin::{Plugin as VstPlugin, PluginParameters};

/// VST2 plugin instance wrapper
pub struct Vst2Instance {
    instance: vst::host::PluginInstance,

    /// Kept alive for the `vst` crate's Host trait dispatch
    #[allow(dead_code)]
    host: Arc<Mutex<SynthHost>>,

    params: Arc<dyn PluginParameters>,

    metadata: PluginMetadata,
    program_count: usize,
    parameter_count: usize,
    num_outputs: usize,

    /// Scratch output channels sized to the plugin's output count
    scratch: Vec<Vec<f32>>,
    silence: Vec<f32>,
}

// Safety: the instance is only ever driven by the thread holding its slot
// lock; the parameter object is never shared outside this wrapper.
unsafe impl Send for Vst2Instance {}

impl Vst2Instance {
    /// Load a VST2 plugin from path. `variant` is reported to shell plugins
    /// as the id of the sub-plugin to instantiate (0 = default).
    pub fn load(path: &Path, variant: i32) -> Result<Self> {
        if !path.exists() {
            return Err(PluginError::load_failed(
                path,
                LoadStage::Scanning,
                "file not found",
            ));
        }

        let host = Arc::new(Mutex::new(SynthHost::new(variant)));

        let mut loader = PluginLoader::load(path, Arc::clone(&host)).map_err(|e| {
            PluginError::load_failed(path, LoadStage::Opening, format!("Failed to load VST: {:?}", e))
        })?;

        let mut instance = loader.instance().map_err(|e| {
            PluginError::load_failed(
                path,
                LoadStage::Instantiation,
                format!("Failed to create instance: {:?}", e),
            )
        })?;

        instance.init();

        let info = instance.get_info();
        let params = instance.get_parameter_object();

        let program_count = info.presets.max(0) as usize;
        let parameter_count = info.parameters.max(0) as usize;
        let num_outputs = info.outputs.max(0) as usize;
        if num_outputs == 0 {
            return Err(PluginError::load_failed(
                path,
                LoadStage::Initialization,
                "plugin has no audio outputs",
            ));
        }

        let metadata = PluginMetadata::new(path.display().to_string(), info.name.clone())
            .variant(variant)
            .vendor(info.vendor.clone())
            .version(format!("{}", info.version))
            .audio_io(info.inputs.max(0) as usize, num_outputs)
            .banks(parameter_count, program_count);

        tracing::debug!(
            "Loaded VST2 '{}' by '{}' (unique id {})",
            info.name,
            info.vendor,
            info.unique_id
        );

        Ok(Self {
            instance,
            host,
            params,
            metadata,
            program_count,
            parameter_count,
            num_outputs,
            scratch: Vec::new(),
            silence: Vec::new(),
        })
    }

    fn ensure_scratch(&mut self, num_samples: usize) {
        let needs_resize = self.scratch.len() != self.num_outputs
            || self.scratch.first().map(Vec::len) != Some(num_samples);
        if needs_resize {
            self.scratch = vec![vec![0.0; num_samples]; self.num_outputs];
            self.silence = vec![0.0; num_samples];
        }
    }

    /// Delivers every event of the block in a single `process_events` call.
    /// Plugins may keep only the last list they were handed per block.
    fn send_events(&mut self, midi_events: &[MidiEvent]) {
        let mut api_events: Vec<api::MidiEvent> = midi_events.iter().map(midi_to_api_event).collect();
        let event_ptrs: Vec<*mut api::Event> = api_events
            .iter_mut()
            .map(|e| e as *mut api::MidiEvent as *mut api::Event)
            .collect();

        let mut buf = events_buffer(&event_ptrs);
        // Safety: `buf` holds an `api::Events` header followed by every pointer,
        // and `api_events` outlives the call.
        let events = unsafe { &*(buf.as_mut_ptr() as *const api::Events) };
        self.instance.process_events(events);
    }
}

/// Lays out an `api::Events` list holding all of `event_ptrs`. The struct
/// declares two inline pointers, so the header is over-allocated to fit the
/// rest. Backed by `u64` words for pointer alignment.
fn events_buffer(event_ptrs: &[*mut api::Event]) -> Vec<u64> {
    let events_offset = std::mem::offset_of!(api::Events, events);
    let needed = events_offset + std::mem::size_of_val(event_ptrs);
    let words = needed.max(std::mem::size_of::<api::Events>()).div_ceil(8);
    let mut buf = vec![0u64; words];

    // Safety: `buf` is 8-byte aligned and sized for the header plus every pointer.
    unsafe {
        let base = buf.as_mut_ptr() as *mut u8;
        let events = &mut *(base as *mut api::Events);
        events.num_events = event_ptrs.len() as i32;
        events._reserved = 0;
        let slots = base.add(events_offset) as *mut *mut api::Event;
        for (i, ptr) in event_ptrs.iter().enumerate() {
            *slots.add(i) = *ptr;
        }
    }
    buf
}

impl PluginInstance for Vst2Instance {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn reset(&mut self) {
        self.instance.suspend();
        self.instance.resume();
    }

    fn program_count(&self) -> usize {
        self.program_count
    }

    fn current_program(&self) -> usize {
        self.params.get_preset_num().max(0) as usize
    }

    fn set_program(&mut self, index: usize) {
        if index < self.program_count {
            self.params.change_preset(index as i32);
        }
    }

    fn program_name(&self, index: usize) -> String {
        if index < self.program_count {
            self.params.get_preset_name(index as i32)
        } else {
            String::new()
        }
    }

    fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    fn parameter_name(&self, index: usize) -> String {
        if index < self.parameter_count {
            self.params.get_parameter_name(index as i32)
        } else {
            String::new()
        }
    }

    fn get_parameter(&self, index: usize) -> f32 {
        if index < self.parameter_count {
            self.params.get_parameter(index as i32)
        } else {
            0.0
        }
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        if index < self.parameter_count {
            self.params.set_parameter(index as i32, value);
        }
    }

    fn configure(&mut self, sample_rate: f64, block_size: usize) {
        self.instance.suspend();
        self.instance.set_sample_rate(sample_rate as f32);
        self.instance.set_block_size(block_size as i64);
        self.instance.resume();
    }

    fn process(&mut self, outputs: &mut [Vec<f32>], ctx: &ProcessContext) {
        let num_samples = outputs.iter().map(Vec::len).min().unwrap_or(0);
        if num_samples == 0 {
            return;
        }

        if !ctx.midi_events.is_empty() {
            self.send_events(ctx.midi_events);
        }

        self.ensure_scratch(num_samples);
        let num_inputs = self.metadata.audio_io.inputs;
        let input_ptrs: Vec<*const f32> = (0..num_inputs).map(|_| self.silence.as_ptr()).collect();
        let mut output_ptrs: Vec<*mut f32> =
            self.scratch.iter_mut().map(|v| v.as_mut_ptr()).collect();

        // Safety: every pointer refers to a live buffer of `num_samples` frames.
        let mut vst_buffer = unsafe {
            VstBuffer::from_raw(
                input_ptrs.len(),
                output_ptrs.len(),
                input_ptrs.as_ptr(),
                output_ptrs.as_mut_ptr(),
                num_samples,
            )
        };

        self.instance.process(&mut vst_buffer);

        // Mono plugins feed every requested channel.
        for (i, out_channel) in outputs.iter_mut().enumerate() {
            let source = &self.scratch[i.min(self.num_outputs - 1)];
            out_channel[..num_samples].copy_from_slice(&source[..num_samples]);
        }
    }
}

fn midi_to_api_event(event: &MidiEvent) -> api::MidiEvent {
    api::MidiEvent {
        event_type: api::EventType::Midi,
        byte_size: std::mem::size_of::<api::MidiEvent>() as i32,
        delta_frames: event.frame_offset as i32,
        flags: api::MidiEventFlags::REALTIME_EVENT.bits(),
        note_length: 0,
        note_offset: 0,
        midi_data: event.to_bytes(),
        _midi_reserved: 0,
        detune: 0,
        note_off_velocity: 0,
        _reserved1: 0,
        _reserved2: 0,
    }
}

/// Host implementation for VST2 plugins
struct SynthHost {
    variant: i32,
}

impl SynthHost {
    fn new(variant: i32) -> Self {
        Self { variant }
    }
}

impl Host for SynthHost {
    fn automate(&self, index: i32, value: f32) {
        tracing::trace!("plugin automated parameter {} -> {}", index, value);
    }

    /// Answers `audioMasterCurrentId`, which shell plugins use to pick the
    /// sub-plugin to instantiate.
    fn get_plugin_id(&self) -> i32 {
        self.variant
    }

    fn idle(&self) {}
}
