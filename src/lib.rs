pub mod audio; // Audio-output contract and the software backend
pub mod dsp;
pub mod editor; // Pointer mapping and keyboard layout
pub mod error;
pub mod harmonics; // Spectrum model, presets, waveform descriptors
pub mod session;
pub mod synth; // Voice management and polyphony

pub use error::{Error, Result};
pub use harmonics::{HarmonicSpectrum, Preset, NUM_HARMONICS};
pub use session::{Session, SessionEvent};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
