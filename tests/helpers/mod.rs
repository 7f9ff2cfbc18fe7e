//! Test helpers and fixtures for synthcast integration tests
//!
//! Hosts are built from the built-in synth so no plugin files are needed.

#![allow(dead_code)]

pub mod tolerances;

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synthcast::plugin::{BuiltinKind, BuiltinSynth, PluginInstance, ProcessContext};
use synthcast::prelude::*;
use synthcast::PluginFactory;

pub const TEST_SAMPLE_RATE: u32 = 44100;
pub const TEST_BLOCK_SIZE: u32 = 512;

/// Factory for the built-in poly synth.
pub fn builtin_factory() -> PluginFactory {
    Arc::new(|| Ok(Box::new(BuiltinSynth::new(BuiltinKind::Poly)) as Box<dyn PluginInstance>))
}

/// Factory that counts how many engines it has built.
pub fn counting_factory() -> (PluginFactory, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let factory: PluginFactory = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BuiltinSynth::new(BuiltinKind::Poly)) as Box<dyn PluginInstance>)
    });
    (factory, count)
}

/// Single-slot host with short timeouts.
pub fn test_host() -> RenderHost {
    test_host_with_pool(1)
}

pub fn test_host_with_pool(pool_size: usize) -> RenderHost {
    RenderHost::builder()
        .pool_size(pool_size)
        .acquire_timeout(Duration::from_millis(200))
        .backoff(Duration::from_millis(5))
        .factory(builtin_factory())
        .build()
        .expect("Failed to create test host")
}

/// Quarter-second render with a short note.
pub fn short_request() -> RenderRequest {
    RenderRequest {
        sample_rate: TEST_SAMPLE_RATE,
        block_size: TEST_BLOCK_SIZE,
        render_seconds: 0.25,
        note_seconds: 0.1,
        ..Default::default()
    }
}

pub fn introspection_request() -> RenderRequest {
    RenderRequest {
        list_parameters: true,
        ..Default::default()
    }
}

/// Renders and returns the encoded bytes.
pub fn render_bytes(host: &RenderHost, request: &RenderRequest) -> Vec<u8> {
    match host.render(request).expect("Render failed") {
        RenderOutput::Audio { bytes, .. } => bytes,
        RenderOutput::Introspection(_) => panic!("Expected audio, got introspection"),
    }
}

pub fn snapshot(host: &RenderHost, request: &RenderRequest) -> synthcast::PluginSnapshot {
    match host.render(request).expect("Introspection failed") {
        RenderOutput::Introspection(snapshot) => snapshot,
        RenderOutput::Audio { .. } => panic!("Expected introspection, got audio"),
    }
}

/// Decodes a 16-bit WAV into its spec and per-channel samples in -1..1.
pub fn decode_wav(bytes: &[u8]) -> (hound::WavSpec, Vec<Vec<f32>>) {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).expect("Invalid WAV");
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let mut out = vec![Vec::new(); channels];
    for (i, sample) in reader.samples::<i16>().enumerate() {
        let sample = sample.expect("Bad WAV sample");
        out[i % channels].push(sample as f32 / 32768.0);
    }
    (spec, out)
}

/// Renders `frames` frames straight from an engine, bypassing the pipeline.
pub fn render_engine(engine: &mut dyn PluginInstance, events: &[MidiEvent], frames: usize) -> Vec<f32> {
    let mut outputs = vec![vec![0.0f32; frames]; 2];
    engine.process(&mut outputs, &ProcessContext::new().midi(events));
    outputs.swap_remove(0)
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}
