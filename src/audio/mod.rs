//! Audio-output contract.
//!
//! The engine never produces samples itself. It drives an audio context that
//! hands out oscillators and gains, accepts scheduled gain automation, and
//! keeps its own clock. Scheduled changes play out on that clock while the
//! engine carries on handling input; nothing here blocks waiting for them.
//!
//! `software` is the in-crate implementation: a control-side context plus a
//! `Renderer` that runs inside the audio callback.

#[cfg(feature = "rtrb")]
pub mod software;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::{dsp::PeriodicWave, error::Result, harmonics::WaveformDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Clock stopped, output silent. New contexts start here.
    Suspended,
    Running,
}

/// Handle to a wavetable oscillator owned by the context.
pub trait OscillatorNode {
    /// Swap the waveform. Phase carries over; the note is not restarted.
    fn set_periodic_wave(&mut self, wave: Arc<PeriodicWave>);

    fn set_frequency(&mut self, hz: f32);

    fn frequency(&self) -> f32;

    fn start(&mut self);

    /// Stop at `time` on the context clock.
    fn stop(&mut self, time: f64);
}

/// Handle to a gain stage with scheduled automation.
pub trait GainNode {
    fn set_value_at_time(&mut self, value: f32, time: f64);

    fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64);

    fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64);

    fn cancel_scheduled_values(&mut self, time: f64);

    /// Gain at the context's current time.
    fn value(&self) -> f32;
}

pub trait AudioContext {
    type Oscillator: OscillatorNode;
    type Gain: GainNode;

    /// Monotonic clock in seconds. Does not advance while suspended.
    fn current_time(&self) -> f64;

    fn state(&self) -> ContextState;

    fn resume(&mut self) -> Result<()>;

    /// Idempotent resume, run before every note-on and editor gesture.
    fn resume_if_suspended(&mut self) -> Result<()> {
        if self.state() == ContextState::Suspended {
            self.resume()?;
        }
        Ok(())
    }

    fn create_oscillator(&mut self) -> Result<Self::Oscillator>;

    fn create_gain(&mut self) -> Result<Self::Gain>;

    /// Render coefficients into a wave, normalizing unless the descriptor
    /// disables it.
    fn create_periodic_wave(&mut self, descriptor: &WaveformDescriptor) -> Arc<PeriodicWave>;

    fn connect(&mut self, oscillator: &Self::Oscillator, gain: &Self::Gain);

    fn connect_to_output(&mut self, gain: &Self::Gain);
}
