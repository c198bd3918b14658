use crate::audio::GainNode;

/*
Voice Envelope
==============

Every note gets the same amplitude shape. It is a policy constant of the
instrument, not something the player edits.

  gain
    1.0 ┤   ╱╲
        │  ╱  ╲___________________
    0.7 ┤ ╱                       ╲
        │╱                         ╲___
  0.001 ┼──────────────────────────────‾‾──→ time
        0  30ms 150ms        note_off   +300ms
        attack decay  sustain     release

  attack   linear 0 → 1.0 over 30 ms
  decay    exponential 1.0 → 0.7, reaching it 150 ms after note-on
  sustain  hold 0.7 while the key is down
  release  exponential from wherever the gain is right now down to 0.001
           over 300 ms; the oscillator stops at the same moment

The shape is not rendered here. We only schedule automation on a GainNode
and the audio context plays it out on its own clock.

Release starts from the CURRENT gain, not the sustain level, so letting go
during the attack fades from the partial level instead of jumping.
Exponential curves cannot reach zero, hence the 0.001 floor.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Seconds from note-on to peak
    pub attack: f64,
    pub peak: f32,
    /// Seconds from note-on until the sustain level is reached
    pub decay_end: f64,
    pub sustain: f32,
    /// Seconds from note-off to the floor (and oscillator stop)
    pub release: f64,
    pub floor: f32,
    /// Seconds used to cut a dying voice on re-trigger (choke policy)
    pub choke: f64,
}

impl EnvelopeShape {
    pub const DEFAULT: Self = Self {
        attack: 0.03,
        peak: 1.0,
        decay_end: 0.15,
        sustain: 0.7,
        release: 0.3,
        floor: 0.001,
        choke: 0.005,
    };

    /// Schedule attack and decay starting at `now`.
    pub fn schedule_attack<G: GainNode>(&self, gain: &mut G, now: f64) {
        gain.set_value_at_time(0.0, now);
        gain.linear_ramp_to_value_at_time(self.peak, now + self.attack);
        gain.exponential_ramp_to_value_at_time(self.sustain, now + self.decay_end);
    }

    /// Replace whatever is scheduled with a release from the current level.
    /// Returns the time at which the oscillator should stop.
    pub fn schedule_release<G: GainNode>(&self, gain: &mut G, now: f64) -> f64 {
        self.fade_out(gain, now, self.release)
    }

    /// Cut a releasing voice short. Returns the new stop time.
    pub fn schedule_choke<G: GainNode>(&self, gain: &mut G, now: f64) -> f64 {
        self.fade_out(gain, now, self.choke)
    }

    fn fade_out<G: GainNode>(&self, gain: &mut G, now: f64, duration: f64) -> f64 {
        // Read before cancelling: the in-flight ramp is what is audible now
        let current = gain.value();
        gain.cancel_scheduled_values(now);
        gain.set_value_at_time(current, now);

        let end = now + duration;
        gain.exponential_ramp_to_value_at_time(self.floor, end);
        end
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::DEFAULT
    }
}
