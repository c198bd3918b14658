//! Benchmarks for polyphonic rendering and live spectrum edits.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_additive::{
    audio::software::{Renderer, SoftwareContext},
    editor::{keyboard::KEYS, EditorLayout},
    Preset, Session,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

/// Session holding the first `voices` keys, settled past the attack.
fn held_chord(voices: usize) -> (Session<SoftwareContext>, Renderer) {
    let (context, mut renderer) = SoftwareContext::new(SAMPLE_RATE, 0.5);
    let mut session = Session::new(context).with_preset(Preset::Sawtooth);

    for binding in KEYS.iter().take(voices) {
        let _ = session.note_on(binding.key, binding.frequency);
    }

    let mut warmup = vec![0.0f32; 512];
    for _ in 0..20 {
        renderer.render_block(&mut warmup);
    }
    (session, renderer)
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SINGLE NOTE ===
        // Baseline: one wavetable oscillator through its envelope
        let (_single, mut renderer) = held_chord(1);
        group.bench_with_input(BenchmarkId::new("single", size), &size, |b, _| {
            b.iter(|| renderer.render_block(black_box(&mut buffer)))
        });

        // === TRIAD ===
        let (_triad, mut renderer) = held_chord(3);
        group.bench_with_input(BenchmarkId::new("triad", size), &size, |b, _| {
            b.iter(|| renderer.render_block(black_box(&mut buffer)))
        });

        // === EVERY KEY ===
        // Worst case the keyboard allows: one voice per mapped key
        let (_all, mut renderer) = held_chord(KEYS.len());
        group.bench_with_input(BenchmarkId::new("all_keys", size), &size, |b, _| {
            b.iter(|| renderer.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

pub fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/edits");
    let layout = EditorLayout::for_canvas(640.0, 320.0);

    // One drag step: map, set, rebuild the wave, push to every held voice.
    // The renderer drains the pushes so the command queue never fills.
    for voices in [0, 4, 8] {
        let (mut session, mut renderer) = held_chord(voices);
        let mut drain = vec![0.0f32; 64];
        let mut x = 45.0f32;

        session.pointer_down(x, 10.0, &layout);
        group.bench_with_input(BenchmarkId::new("drag_step", voices), &voices, |b, _| {
            b.iter(|| {
                x = if x >= 625.0 { 45.0 } else { x + 1.0 };
                session.pointer_move(black_box(x), 10.0, &layout);
                session.drain_events().for_each(drop);
                renderer.render_block(&mut drain);
            })
        });
        session.pointer_up();
    }

    group.finish();
}
