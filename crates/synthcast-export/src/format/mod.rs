//! Audio format encoders
//!
//! Each encoder is feature-gated:
//! - `wav`: WAV via hound (pure Rust)
//! - `flac`: FLAC via flacenc (pure Rust)

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "flac")]
pub mod flac;

/// Scales a float sample to a signed integer of `bits` width. Input outside
/// -1..1 is clipped; the result is symmetric (no use of the most negative code).
#[inline]
pub(crate) fn quantize(sample: f32, bits: u16) -> i32 {
    let full_scale = ((1i64 << (bits - 1)) - 1) as f32;
    (sample.clamp(-1.0, 1.0) * full_scale) as i32
}
