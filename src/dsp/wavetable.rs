use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::harmonics::WaveformDescriptor;

/// Samples per stored period. Coefficients at or above `WAVETABLE_SIZE / 2`
/// cannot be represented and are dropped.
pub const WAVETABLE_SIZE: usize = 2048;

/*
Wavetables from Fourier Coefficients
====================================

A periodic waveform is a sum of cosines and sines at integer multiples of
the fundamental:

    x(θ) = Σ real[k]·cos(kθ) + imag[k]·sin(kθ)

Summing sixteen sines for every output sample would work, but the period
never changes between edits, so we render it once into a table and let the
oscillator read the table with a phase accumulator.

The inverse FFT does the summing for us. For one coefficient pair (a, b) at
bin k, placing

    X[k]     = (a - i·b) / 2
    X[L - k] = (a + i·b) / 2

makes the (unnormalized) inverse transform produce exactly a·cos + b·sin in
its real part. The DC bin is ignored.

Normalization scales the finished table so its largest magnitude is 1.0.
A silent table stays silent.
*/

#[derive(Debug, Clone)]
pub struct PeriodicWave {
    table: Vec<f32>,
    /// Peak magnitude before normalization
    peak: f32,
}

impl PeriodicWave {
    pub fn silent() -> Self {
        Self {
            table: vec![0.0; WAVETABLE_SIZE],
            peak: 0.0,
        }
    }

    /// Convenience for one-off builds; reuse a `WavetableBuilder` when
    /// building repeatedly.
    pub fn from_descriptor(descriptor: &WaveformDescriptor) -> Self {
        WavetableBuilder::new().build(descriptor)
    }

    /// Read the table at `phase` (cycles, wrapped into `0.0..1.0`) with linear
    /// interpolation.
    #[inline]
    pub fn sample(&self, phase: f64) -> f32 {
        let position = phase.rem_euclid(1.0) * WAVETABLE_SIZE as f64;
        let index = position as usize % WAVETABLE_SIZE;
        let next = (index + 1) % WAVETABLE_SIZE;
        let frac = (position - position.floor()) as f32;

        let a = self.table[index];
        let b = self.table[next];
        a + (b - a) * frac
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn is_silent(&self) -> bool {
        self.peak == 0.0
    }
}

/// Reusable inverse-FFT plan and scratch space.
pub struct WavetableBuilder {
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl WavetableBuilder {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_inverse(WAVETABLE_SIZE);

        Self {
            fft,
            scratch: vec![Complex::new(0.0, 0.0); WAVETABLE_SIZE],
        }
    }

    pub fn build(&mut self, descriptor: &WaveformDescriptor) -> PeriodicWave {
        self.build_from_coefficients(
            &descriptor.real,
            &descriptor.imag,
            !descriptor.disable_normalization,
        )
    }

    pub fn build_from_coefficients(
        &mut self,
        real: &[f32],
        imag: &[f32],
        normalize: bool,
    ) -> PeriodicWave {
        self.scratch.fill(Complex::new(0.0, 0.0));

        let terms = real.len().max(imag.len()).min(WAVETABLE_SIZE / 2);
        for k in 1..terms {
            let a = real.get(k).copied().unwrap_or(0.0);
            let b = imag.get(k).copied().unwrap_or(0.0);
            self.scratch[k] = Complex::new(a, -b) * 0.5;
            self.scratch[WAVETABLE_SIZE - k] = Complex::new(a, b) * 0.5;
        }

        self.fft.process(&mut self.scratch);

        let mut table: Vec<f32> = self.scratch.iter().map(|c| c.re).collect();
        let peak = table.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));

        if normalize && peak > f32::EPSILON {
            for sample in table.iter_mut() {
                *sample /= peak;
            }
        }

        PeriodicWave { table, peak }
    }
}

impl Default for WavetableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
