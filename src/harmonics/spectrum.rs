use crate::{
    error::{Error, Result},
    harmonics::preset::Preset,
};

/// Number of harmonics the editor exposes (fundamental included).
pub const NUM_HARMONICS: usize = 16;

/// Per-harmonic amplitudes. Index 0 is the fundamental, index `i` the
/// `(i + 1)`-th harmonic. Every value stays within `0.0..=1.0`.
///
/// The length is part of the type, so the only way a write can go wrong is an
/// index past the end, which is rejected.
#[derive(Debug, Clone)]
pub struct HarmonicSpectrum {
    amplitudes: [f32; NUM_HARMONICS],
    dirty: bool,
}

impl HarmonicSpectrum {
    /// All harmonics at zero.
    pub fn silent() -> Self {
        Self {
            amplitudes: [0.0; NUM_HARMONICS],
            dirty: false,
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self {
            amplitudes: preset.amplitudes(),
            dirty: false,
        }
    }

    /// Set one harmonic. The value is clamped into `0.0..=1.0`; NaN counts as
    /// zero.
    pub fn set_amplitude(&mut self, index: usize, value: f32) -> Result<()> {
        let slot = self.amplitudes.get_mut(index).ok_or(Error::Range {
            index,
            len: NUM_HARMONICS,
        })?;

        *slot = clamp_unit(value);
        self.dirty = true;
        Ok(())
    }

    /// Zero every harmonic.
    pub fn reset(&mut self) {
        self.amplitudes = [0.0; NUM_HARMONICS];
        self.dirty = true;
    }

    /// Replace the whole vector with a named preset.
    ///
    /// The spectrum is untouched when the name is unknown.
    pub fn load_preset(&mut self, name: &str) -> Result<()> {
        let preset: Preset = name.parse()?;
        self.apply_preset(preset);
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.replace(preset.amplitudes());
    }

    /// Bulk replacement. Values are clamped like `set_amplitude`.
    pub fn replace(&mut self, amplitudes: [f32; NUM_HARMONICS]) {
        self.amplitudes = amplitudes.map(clamp_unit);
        self.dirty = true;
    }

    pub fn amplitude(&self, index: usize) -> Option<f32> {
        self.amplitudes.get(index).copied()
    }

    /// Snapshot of the whole vector.
    pub fn amplitudes(&self) -> [f32; NUM_HARMONICS] {
        self.amplitudes
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.amplitudes.iter().copied()
    }

    pub fn is_silent(&self) -> bool {
        self.amplitudes.iter().all(|&a| a == 0.0)
    }

    /// True when the spectrum changed since the last `take_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Report and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for HarmonicSpectrum {
    fn default() -> Self {
        Self::from_preset(Preset::Sine)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
