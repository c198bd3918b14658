//! Harmonic spectrum model.
//!
//! The spectrum is the instrument's only editable state: sixteen amplitudes,
//! one per harmonic. Everything audible is derived from it. The waveform
//! builder turns it into Fourier coefficients, and presets replace it
//! wholesale.

/// Static spectrum table (sine, sawtooth, square, ...).
pub mod preset;
/// Fixed-length amplitude vector and its mutation rules.
pub mod spectrum;
/// Spectrum to periodic-waveform coefficients.
pub mod waveform;

pub use preset::Preset;
pub use spectrum::{HarmonicSpectrum, NUM_HARMONICS};
pub use waveform::WaveformDescriptor;
