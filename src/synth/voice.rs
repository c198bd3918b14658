use crate::synth::envelope::EnvelopeShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Attacking,  // Note-on scheduled, gain still heading for sustain
    Sustaining, // Holding the sustain level while the key is down
    Releasing,  // Key released, fading out until the scheduled stop
}

/// One sounding note.
///
/// The oscillator and gain belong to the audio context; the voice only keeps
/// the handles so it can reschedule and retune them.
pub struct Voice<O, G> {
    oscillator: O,
    gain: G,
    frequency: f32,
    started_at: f64,
    stop_at: Option<f64>,
}

impl<O, G> Voice<O, G> {
    pub fn new(oscillator: O, gain: G, frequency: f32, started_at: f64) -> Self {
        Self {
            oscillator,
            gain,
            frequency,
            started_at,
            stop_at: None,
        }
    }

    /// Logical state at `now`, derived from the schedule.
    pub fn state_at(&self, now: f64, shape: &EnvelopeShape) -> VoiceState {
        if self.stop_at.is_some() {
            VoiceState::Releasing
        } else if now < self.started_at + shape.decay_end {
            VoiceState::Attacking
        } else {
            VoiceState::Sustaining
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Scheduled stop time, once released.
    pub fn stop_at(&self) -> Option<f64> {
        self.stop_at
    }

    pub(crate) fn mark_stopping(&mut self, stop_at: f64) {
        self.stop_at = Some(stop_at);
    }

    /// True once the release tail has fully played out.
    pub fn is_finished(&self, now: f64) -> bool {
        self.stop_at.is_some_and(|stop| now >= stop)
    }

    pub fn oscillator(&self) -> &O {
        &self.oscillator
    }

    pub fn gain(&self) -> &G {
        &self.gain
    }

    pub(crate) fn nodes_mut(&mut self) -> (&mut O, &mut G) {
        (&mut self.oscillator, &mut self.gain)
    }
}
