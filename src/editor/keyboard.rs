/// One playable key on the computer keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBinding {
    pub note: &'static str,
    pub frequency: f32,
    pub is_black: bool,
    pub key: char,
    /// Text printed on the key (the character, upper-cased).
    pub label: &'static str,
}

const fn key(
    note: &'static str,
    frequency: f32,
    is_black: bool,
    key: char,
    label: &'static str,
) -> KeyBinding {
    KeyBinding {
        note,
        frequency,
        is_black,
        key,
        label,
    }
}

// Home row plays the white keys, the row above the black ones.
// C4 through E5, equal temperament at A4 = 440 Hz.
pub const KEYS: [KeyBinding; 17] = [
    key("C4", 261.63, false, 'a', "A"),
    key("C#4", 277.18, true, 'w', "W"),
    key("D4", 293.66, false, 's', "S"),
    key("D#4", 311.13, true, 'e', "E"),
    key("E4", 329.63, false, 'd', "D"),
    key("F4", 349.23, false, 'f', "F"),
    key("F#4", 369.99, true, 't', "T"),
    key("G4", 392.00, false, 'g', "G"),
    key("G#4", 415.30, true, 'y', "Y"),
    key("A4", 440.00, false, 'h', "H"),
    key("A#4", 466.16, true, 'u', "U"),
    key("B4", 493.88, false, 'j', "J"),
    key("C5", 523.25, false, 'k', "K"),
    key("C#5", 554.37, true, 'o', "O"),
    key("D5", 587.33, false, 'l', "L"),
    key("D#5", 622.25, true, 'p', "P"),
    key("E5", 659.25, false, ';', ";"),
];

/// Binding for a typed character. Letters match either case.
pub fn lookup(c: char) -> Option<&'static KeyBinding> {
    let c = c.to_ascii_lowercase();
    KEYS.iter().find(|binding| binding.key == c)
}

/// White keys in order, for drawing.
pub fn white_keys() -> impl Iterator<Item = &'static KeyBinding> {
    KEYS.iter().filter(|binding| !binding.is_black)
}

/// Black keys paired with the number of white keys to their left.
pub fn black_keys() -> impl Iterator<Item = (usize, &'static KeyBinding)> {
    KEYS.iter()
        .scan(0usize, |whites, binding| {
            if binding.is_black {
                Some(Some((*whites, binding)))
            } else {
                *whites += 1;
                Some(None)
            }
        })
        .flatten()
}
