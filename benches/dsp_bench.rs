//! Benchmarks for the synthesis core and real-world playing scenarios.
//!
//! Run with: cargo bench
//!
//! The renderer runs inside the audio callback, so everything it does per
//! block must fit well within the real-time deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Wavetable synthesis and gain automation
//!   - scenarios/*  Chords through the software renderer, live spectrum edits

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP
    dsp::bench_wavetable,
    dsp::bench_automation,
    // Real-world scenarios
    scenarios::bench_voices,
    scenarios::bench_edits,
);
criterion_main!(benches);
