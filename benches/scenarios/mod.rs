//! Real-world scenario benchmarks.
//!
//! These model actual playing: chords held through the software renderer,
//! and dragging across the editor while notes sound.

mod voices;

pub use voices::{bench_edits, bench_voices};
