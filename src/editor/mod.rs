//! Harmonic editor geometry and the note keyboard.
//!
//! Nothing in here touches audio. The layout turns pointer positions into
//! (harmonic, amplitude) pairs and the keyboard turns characters into notes;
//! `Session` decides what to do with them.

pub mod keyboard;
pub mod layout;

use std::borrow::Cow;

pub use keyboard::{lookup, KeyBinding, KEYS};
pub use layout::{map_pointer, EditorLayout};

/// Pointer drawing state. A drag paints every bar it crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Dragging,
}

/// Musical name of the interval a harmonic sits at above the fundamental.
///
/// Only the first few harmonics have a familiar name. The rest are shown by
/// their harmonic number (index 8 is the 9th harmonic, labelled "9").
pub fn harmonic_label(index: usize) -> Cow<'static, str> {
    match index {
        0 => Cow::Borrowed("Root"),
        1 => Cow::Borrowed("8va"),
        2 => Cow::Borrowed("P5"),
        3 => Cow::Borrowed("15ma"),
        4 => Cow::Borrowed("M3"),
        5 => Cow::Borrowed("P5"),
        6 => Cow::Borrowed("m7"),
        7 => Cow::Borrowed("22ma"),
        n => Cow::Owned((n + 1).to_string()),
    }
}

/// Every harmonic with an interval name gets a guide line.
pub fn is_guideline(index: usize) -> bool {
    index < NAMED_INTERVALS
}

const NAMED_INTERVALS: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_name_the_low_intervals() {
        assert_eq!(harmonic_label(0), "Root");
        assert_eq!(harmonic_label(2), "P5");
        assert_eq!(harmonic_label(7), "22ma");
        assert_eq!(harmonic_label(8), "9");
        assert_eq!(harmonic_label(15), "16");
    }

    #[test]
    fn guidelines_follow_named_intervals() {
        let lines: Vec<usize> = (0..16).filter(|&i| is_guideline(i)).collect();
        assert_eq!(lines, (0..8).collect::<Vec<_>>());

        for index in 0..16 {
            let named = harmonic_label(index).parse::<usize>().is_err();
            assert_eq!(is_guideline(index), named, "index {index}");
        }
    }
}
