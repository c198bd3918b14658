use std::fmt;

/// Errors reported by the instrument core.
///
/// Everything else in the engine is total: duplicate note events, out-of-range
/// amplitudes and pointer positions outside the plot are absorbed rather than
/// reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Spectrum index outside `0..len`.
    Range { index: usize, len: usize },
    /// Preset name not present in the preset table.
    UnknownPreset(String),
    /// Release policy name that is neither `overlap` nor `choke`.
    UnknownPolicy(String),
    /// The audio backend could not supply nodes or could not be resumed.
    AudioUnavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Range { index, len } => {
                write!(f, "harmonic index {index} out of range (0..{len})")
            }
            Error::UnknownPreset(name) => write!(f, "unknown preset '{name}'"),
            Error::UnknownPolicy(name) => write!(f, "unknown release policy '{name}'"),
            Error::AudioUnavailable(reason) => write!(f, "audio unavailable: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = Error::Range { index: 16, len: 16 };
        assert_eq!(err.to_string(), "harmonic index 16 out of range (0..16)");

        let err = Error::UnknownPreset("kazoo".into());
        assert_eq!(err.to_string(), "unknown preset 'kazoo'");
    }
}
