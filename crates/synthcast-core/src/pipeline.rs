//! Render pipeline.
//!
//! Runs one request against one exclusively-held engine:
//!
//! 1. reset, restore captured defaults, select program 0
//! 2. select the requested program, if it exists
//! 3. apply named overrides, then indexed overrides
//! 4. introspection: snapshot and return
//! 5. audio: configure, schedule note-on/all-notes-off, render and encode
//!    block by block
//! 6. reset again, whatever the outcome
//!
//! Engines keep state between requests, so steps 1 and 6 are never skipped.

use crate::request::{RenderRequest, ResponseKind};
use crate::snapshot::PluginSnapshot;
use crate::Result;
use synthcast_export::{encoder_for, BlockEncoder};
use synthcast_plugin::{MidiEvent, MidiEventVec, PluginInstance, ProcessContext};

/// Result of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutput {
    Audio {
        bytes: Vec<u8>,
        content_type: &'static str,
        frames: u64,
    },
    Introspection(PluginSnapshot),
}

impl RenderOutput {
    pub fn content_type(&self) -> &'static str {
        match self {
            RenderOutput::Audio { content_type, .. } => content_type,
            RenderOutput::Introspection(_) => "application/json",
        }
    }

    /// Response body bytes.
    pub fn into_body(self) -> Result<Vec<u8>> {
        match self {
            RenderOutput::Audio { bytes, .. } => Ok(bytes),
            RenderOutput::Introspection(snapshot) => snapshot.to_json(),
        }
    }
}

/// Encoder for an audio request, or `None` for introspection. Fails with
/// `UnsupportedFormat` for containers without an encoder, so callers can
/// reject a request before they hold an engine.
pub fn prepare_encoder(request: &RenderRequest) -> Result<Option<Box<dyn BlockEncoder>>> {
    match request.response_kind() {
        ResponseKind::Introspection => Ok(None),
        ResponseKind::Audio(container) => {
            let options = request.encoder_options()?;
            Ok(Some(encoder_for(&container, &options)?))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPipeline<'a> {
    defaults: Option<&'a [f32]>,
}

impl<'a> RenderPipeline<'a> {
    /// `defaults` are restored into the engine before each request.
    pub fn new(defaults: Option<&'a [f32]>) -> Self {
        Self { defaults }
    }

    pub fn run(&self, engine: &mut dyn PluginInstance, request: &RenderRequest) -> Result<RenderOutput> {
        let encoder = prepare_encoder(request)?;
        self.run_with_encoder(engine, request, encoder)
    }

    /// Like `run`, with the encoder already built by `prepare_encoder`.
    pub fn run_with_encoder(
        &self,
        engine: &mut dyn PluginInstance,
        request: &RenderRequest,
        encoder: Option<Box<dyn BlockEncoder>>,
    ) -> Result<RenderOutput> {
        self.restore_baseline(engine);
        let result = execute(engine, request, encoder);
        engine.reset();
        result
    }

    fn restore_baseline(&self, engine: &mut dyn PluginInstance) {
        engine.reset();
        if let Some(defaults) = self.defaults {
            for (index, &value) in defaults.iter().enumerate().take(engine.parameter_count()) {
                engine.set_parameter(index, value);
            }
        }
        engine.set_program(0);
    }
}

fn execute(
    engine: &mut dyn PluginInstance,
    request: &RenderRequest,
    encoder: Option<Box<dyn BlockEncoder>>,
) -> Result<RenderOutput> {
    select_program(engine, request);
    apply_parameters(engine, request);

    match encoder {
        Some(encoder) => render_audio(engine, request, encoder),
        None => Ok(RenderOutput::Introspection(PluginSnapshot::capture(engine))),
    }
}

/// Selects the requested program when it exists. Out-of-range programs leave
/// the current one in place.
pub fn select_program(engine: &mut dyn PluginInstance, request: &RenderRequest) {
    let Some(program) = request.program() else {
        return;
    };

    let count = engine.program_count();
    if program >= count {
        tracing::debug!(program, count, "Requested program out of range, ignored");
        return;
    }

    engine.set_program(program);
    let current = engine.current_program();
    if current != program {
        tracing::warn!(program, current, "Engine did not switch program");
    }
}

/// Applies named overrides, then indexed ones, so an index wins over a name
/// that resolves to the same parameter. Values are clamped to 0..1;
/// non-finite values, unknown names and out-of-range indices are skipped.
pub fn apply_parameters(engine: &mut dyn PluginInstance, request: &RenderRequest) {
    let count = engine.parameter_count();

    if !request.parameters.is_empty() {
        let names: Vec<String> = (0..count).map(|i| engine.parameter_name(i)).collect();
        for (name, &value) in &request.parameters {
            let Some(value) = normalized(value) else {
                continue;
            };
            let mut matched = false;
            for (index, _) in names.iter().enumerate().filter(|(_, n)| *n == name) {
                engine.set_parameter(index, value);
                matched = true;
            }
            if !matched {
                tracing::debug!(name = %name, "Unknown parameter name, ignored");
            }
        }
    }

    for (key, &value) in &request.indexed_parameters {
        let Some(value) = normalized(value) else {
            continue;
        };
        match key.trim().parse::<usize>() {
            Ok(index) if index < count => engine.set_parameter(index, value),
            _ => tracing::debug!(key = %key, count, "Parameter index out of range, ignored"),
        }
    }
}

fn normalized(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

/// Note-on at frame 0 and all-notes-off at the note-off frame, in absolute
/// sample positions.
pub fn note_script(request: &RenderRequest) -> [MidiEvent; 2] {
    let channel = request.channel_index();
    [
        MidiEvent::note_on(0, channel, request.midi_pitch, request.midi_velocity),
        MidiEvent::all_notes_off(request.note_off_frame(), channel),
    ]
}

/// Collects the events that fall inside `[start, start + frames)`, re-offset
/// relative to the block start. Each event reaches the engine exactly once,
/// in the block that contains it; handing every block the whole script would
/// retrigger the note-on at frame 0 of each block.
pub fn events_in_block(events: &[MidiEvent], start: usize, frames: usize, out: &mut MidiEventVec) {
    out.clear();
    let end = start + frames;
    out.extend(
        events
            .iter()
            .filter(|e| e.frame_offset >= start && e.frame_offset < end)
            .map(|e| e.with_offset(e.frame_offset - start)),
    );
}

fn render_audio(
    engine: &mut dyn PluginInstance,
    request: &RenderRequest,
    mut encoder: Box<dyn BlockEncoder>,
) -> Result<RenderOutput> {
    let frames = request.frames_per_block();
    let blocks = request.block_count();
    engine.configure(request.sample_rate as f64, frames);

    let script = note_script(request);
    let mut block_events = MidiEventVec::new();
    let mut buffers = vec![vec![0.0f32; frames]; request.n_channels as usize];

    for block in 0..blocks {
        let start = block * frames;
        events_in_block(&script, start, frames, &mut block_events);

        let ctx = ProcessContext::new().midi(&block_events);
        engine.process(&mut buffers, &ctx);
        encoder.push_block(&buffers, frames)?;
    }

    let content_type = encoder.content_type();
    let frames_written = encoder.frames_written();
    let bytes = encoder.finish()?;

    tracing::debug!(
        blocks,
        frames = frames_written,
        bytes = bytes.len(),
        "Render complete"
    );

    Ok(RenderOutput::Audio {
        bytes,
        content_type,
        frames: frames_written,
    })
}
