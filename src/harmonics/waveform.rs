#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::harmonics::spectrum::{HarmonicSpectrum, NUM_HARMONICS};

/// Fourier coefficients of one waveform period.
///
/// Both arrays hold `NUM_HARMONICS + 1` terms. Term 0 is the DC slot and is
/// always zero; term `k` scales `cos(k·θ)` (real) and `sin(k·θ)` (imag).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformDescriptor {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
    /// When false the backend scales the rendered period to unit peak.
    pub disable_normalization: bool,
}

impl WaveformDescriptor {
    pub fn len(&self) -> usize {
        self.imag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imag.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.real.iter().chain(&self.imag).all(|&c| c == 0.0)
    }
}

/// Build the coefficient pair for a spectrum.
///
/// Every harmonic goes on the sine basis, so all partials cross zero together
/// at the start of the period. The real array stays zero and the result is
/// left unnormalized; peak scaling is requested from the backend instead.
pub fn build(spectrum: &HarmonicSpectrum) -> WaveformDescriptor {
    let real = vec![0.0; NUM_HARMONICS + 1];
    let mut imag = vec![0.0; NUM_HARMONICS + 1];

    for (coefficient, amp) in imag[1..].iter_mut().zip(spectrum.iter()) {
        *coefficient = amp;
    }

    WaveformDescriptor {
        real,
        imag,
        disable_normalization: false,
    }
}
