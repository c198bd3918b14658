//! Benchmarks for gain automation evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_additive::{audio::GainNode, dsp::AutomationTimeline, synth::EnvelopeShape};

use crate::BLOCK_SIZES;

/// Minimal gain node over a bare timeline
struct Gain(AutomationTimeline);

impl GainNode for Gain {
    fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.0.set_value_at_time(value, time);
    }
    fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.0.linear_ramp_to_value_at_time(value, time);
    }
    fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.0.exponential_ramp_to_value_at_time(value, time);
    }
    fn cancel_scheduled_values(&mut self, time: f64) {
        self.0.cancel_scheduled_values(time);
    }
    fn value(&self) -> f32 {
        self.0.value_at(0.0)
    }
}

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let sample_rate = 48_000.0;

    let mut gain = Gain(AutomationTimeline::new(1.0));
    EnvelopeShape::DEFAULT.schedule_attack(&mut gain, 0.0);
    let envelope = gain.0;

    // (name, block start time): linear attack, exponential decay, past the end
    let segments = [("attack", 0.001), ("decay", 0.05), ("sustain", 1.0)];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, start) in segments {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, sample) in buffer.iter_mut().enumerate() {
                        *sample = envelope.value_at(start + i as f64 / sample_rate);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
