//! Offline chord
//!
//! Plays a C major chord with the bell spectrum through the software
//! renderer, without opening an audio device, and prints the level every
//! 50 ms. Halfway through, the spectrum is switched to organ while the chord
//! is held: the voices keep sounding and only their timbre changes.
//!
//! Run with: cargo run --example offline_chord

use saavy_additive::{audio::software::SoftwareContext, Preset, Session};

const SAMPLE_RATE: f32 = 48_000.0;
const WINDOW: usize = 2_400; // 50 ms

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let (context, mut renderer) = SoftwareContext::new(SAMPLE_RATE, 0.5);
    let mut session = Session::new(context).with_preset(Preset::Bell);

    // C4, E4, G4 from the home row
    for key in ['a', 'd', 'g'] {
        session.key_down(key, false)?;
    }

    let mut window = vec![0.0f32; WINDOW];
    for step in 0..24 {
        match step {
            8 => session.apply_preset(Preset::Organ),
            14 => session.release_all(),
            _ => {}
        }

        renderer.render_block(&mut window);

        let peak = window.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (window.iter().map(|&x| x * x).sum::<f32>() / WINDOW as f32).sqrt();
        println!(
            "{:>5} ms  peak {:.3}  rms {:.3}  voices {} ({} oscillators)",
            step * 50,
            peak,
            rms,
            session.active_voices().len(),
            renderer.active_oscillators(),
        );
    }

    Ok(())
}
