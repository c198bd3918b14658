//! additive - terminal additive synthesizer
//!
//! Draw a harmonic spectrum with the mouse, play it from the keyboard.
//!
//! Run with: cargo run --bin additive -- --preset organ

mod app;
mod cli;
mod ui;

use clap::Parser;

use app::Additive;
use cli::Args;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    cli::init_logging(&args)?;

    Additive::from_args(&args).run()
}
