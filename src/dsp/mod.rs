//! Low-level DSP primitives used by the audio backend.
//!
//! Both pieces are plain data plus math: no threads, no queues. The software
//! backend keeps one copy on the control thread and one on the audio thread
//! and relies on them evaluating identically.

/// Scheduled parameter changes (set, linear ramp, exponential ramp).
pub mod automation;
/// Single-period wavetables built from Fourier coefficients.
pub mod wavetable;

pub use automation::AutomationTimeline;
pub use wavetable::{PeriodicWave, WavetableBuilder, WAVETABLE_SIZE};
