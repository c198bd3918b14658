use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::Error, harmonics::spectrum::NUM_HARMONICS};

/*
Preset Spectra
==============

Each preset is a recipe for the sixteen harmonic amplitudes. The classic
waveforms fall straight out of their Fourier series:

  sine      fundamental only
  sawtooth  every harmonic at 1/n
  square    odd harmonics (n = 1, 3, 5, ...) at 1/n

Index i holds harmonic n = i + 1, so "odd harmonics" live at even indices.

The remaining presets are hand-tuned tables: a clarinet keeps the square's
odd series but lets a whisper of the even harmonics through, the organ
approximates a drawbar registration, and the bell spreads its energy over
sparse upper partials.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Sine,
    Sawtooth,
    Square,
    Clarinet,
    Organ,
    Bell,
}

const ORGAN: &[(usize, f32)] = &[(0, 1.0), (1, 0.8), (2, 0.4), (3, 0.6), (5, 0.5), (7, 0.3)];
const BELL: &[(usize, f32)] = &[(0, 1.0), (3, 0.7), (6, 0.4), (10, 0.3), (14, 0.15)];

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Sine,
        Preset::Sawtooth,
        Preset::Square,
        Preset::Clarinet,
        Preset::Organ,
        Preset::Bell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Sine => "sine",
            Preset::Sawtooth => "sawtooth",
            Preset::Square => "square",
            Preset::Clarinet => "clarinet",
            Preset::Organ => "organ",
            Preset::Bell => "bell",
        }
    }

    pub fn amplitudes(self) -> [f32; NUM_HARMONICS] {
        let mut amps = [0.0; NUM_HARMONICS];

        match self {
            Preset::Sine => amps[0] = 1.0,
            Preset::Sawtooth => {
                for (i, amp) in amps.iter_mut().enumerate() {
                    *amp = 1.0 / (i + 1) as f32;
                }
            }
            Preset::Square => {
                for (i, amp) in amps.iter_mut().enumerate().step_by(2) {
                    *amp = 1.0 / (i + 1) as f32;
                }
            }
            Preset::Clarinet => {
                for (i, amp) in amps.iter_mut().enumerate() {
                    let weight = if i % 2 == 0 { 1.0 } else { 0.1 };
                    *amp = weight / (i + 1) as f32;
                }
            }
            Preset::Organ => fill_partials(&mut amps, ORGAN),
            Preset::Bell => fill_partials(&mut amps, BELL),
        }

        amps
    }
}

fn fill_partials(amps: &mut [f32; NUM_HARMONICS], partials: &[(usize, f32)]) {
    for &(index, amp) in partials.iter().filter(|(index, _)| *index < NUM_HARMONICS) {
        amps[index] = amp;
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_case_insensitively() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
        assert_eq!("Sawtooth".parse::<Preset>(), Ok(Preset::Sawtooth));
        assert!("".parse::<Preset>().is_err());
    }

    #[test]
    fn clarinet_whispers_even_harmonics() {
        let amps = Preset::Clarinet.amplitudes();
        assert_eq!(amps[0], 1.0);
        assert_eq!(amps[1], 0.1 / 2.0);
        assert_eq!(amps[2], 1.0 / 3.0);
    }

    #[test]
    fn sparse_tables_only_touch_listed_partials() {
        let bell = Preset::Bell.amplitudes();
        let lit: Vec<usize> = (0..NUM_HARMONICS).filter(|&i| bell[i] > 0.0).collect();
        assert_eq!(lit, vec![0, 3, 6, 10, 14]);

        let organ = Preset::Organ.amplitudes();
        assert_eq!(organ[3], 0.6);
        assert_eq!(organ[4], 0.0);
    }

    #[test]
    fn every_preset_stays_in_unit_range() {
        for preset in Preset::ALL {
            assert!(preset.amplitudes().iter().all(|a| (0.0..=1.0).contains(a)));
        }
    }
}
