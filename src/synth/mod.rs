// Purpose: Voice management, polyphony, envelope policy
// This layer sits above the audio contract and owns the note lifecycle

pub mod envelope;
pub mod registry;
pub mod voice;

pub use envelope::EnvelopeShape;
pub use registry::{ReleasePolicy, VoiceRegistry};
pub use voice::{Voice, VoiceState};
