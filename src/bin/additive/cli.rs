//! Command-line argument parsing.

use std::{fs::File, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use env_logger::{Env, Target};

use saavy_additive::{synth::ReleasePolicy, Preset};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "additive")]
#[command(about = "Additive synthesizer: draw harmonics, play notes", long_about = None)]
pub struct Args {
    /// Starting spectrum: sine, sawtooth, square, clarinet, organ, bell
    #[arg(long, value_name = "PRESET", default_value = "sine")]
    pub preset: Preset,

    /// Output level applied after all voices are summed (0.0 - 1.0)
    #[arg(long, value_name = "GAIN", default_value = "0.5")]
    pub master_gain: f32,

    /// What re-pressing a fading key does: overlap or choke
    #[arg(long, value_name = "POLICY", default_value = "overlap")]
    pub release_policy: ReleasePolicy,

    /// How long a key sounds when the terminal cannot report key releases
    #[arg(long, value_name = "MS", default_value = "300")]
    pub hold_ms: u64,

    /// Run the editor without opening an audio device
    #[arg(long)]
    pub no_audio: bool,

    /// Write log output to this file (the terminal belongs to the UI)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Route `log` output to the log file. Without one, logging stays off unless
/// RUST_LOG asks for it, and then goes to stderr.
pub fn init_logging(args: &Args) -> EyreResult<()> {
    let default_filter = match &args.log_file {
        Some(_) => "info,saavy_additive=debug",
        None => "off",
    };
    let env = Env::default().default_filter_or(default_filter);
    let mut builder = env_logger::Builder::from_env(env);

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .wrap_err("failed to initialize logging")?;
    Ok(())
}
