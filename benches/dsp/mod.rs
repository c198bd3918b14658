//! Benchmarks for low-level DSP.

mod automation;
mod wavetable;

pub use automation::bench_automation;
pub use wavetable::bench_wavetable;
