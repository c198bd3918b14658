//! Benchmarks for wavetable construction and playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_additive::{
    dsp::WavetableBuilder,
    harmonics::{waveform, HarmonicSpectrum, Preset},
};

use crate::BLOCK_SIZES;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");
    let mut builder = WavetableBuilder::new();

    // Runs on every spectrum edit, on the UI thread
    for preset in [Preset::Sine, Preset::Sawtooth, Preset::Bell] {
        let descriptor = waveform::build(&HarmonicSpectrum::from_preset(preset));
        group.bench_with_input(
            BenchmarkId::new("build", preset.name()),
            &descriptor,
            |b, descriptor| {
                b.iter(|| builder.build(black_box(descriptor)));
            },
        );
    }

    // Per-sample lookup, as in the renderer's inner loop
    let wave = builder.build(&waveform::build(&HarmonicSpectrum::from_preset(
        Preset::Sawtooth,
    )));
    let step = 440.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut phase = 0.0f64;

        group.bench_with_input(BenchmarkId::new("sample", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = wave.sample(phase);
                    phase = (phase + step).fract();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
