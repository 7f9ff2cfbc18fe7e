//! Tolerance constants for rendered audio.

/// Parameter values read back after a set (f32 round trip).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// 16-bit quantization step size.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;
