//! Application setup: audio device, terminal, and the session that ties
//! them together.

use std::{io::stdout, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use log::{error, info, warn};
use rtrb::{Producer, RingBuffer};

use saavy_additive::{
    audio::software::SoftwareContext, synth::ReleasePolicy, Preset, Session, MAX_BLOCK_SIZE,
};

use super::cli::Args;
use super::ui::{AudioInfo, UiApp};

/// Rate assumed for the clock when no device is open
const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;

/// Samples buffered between the audio callback and the scope view
const SCOPE_QUEUE_SIZE: usize = 8192;

pub struct Additive {
    preset: Preset,
    master_gain: f32,
    policy: ReleasePolicy,
    hold: Duration,
    no_audio: bool,
}

impl Additive {
    pub fn from_args(args: &Args) -> Self {
        Self {
            preset: args.preset,
            master_gain: args.master_gain,
            policy: args.release_policy,
            hold: Duration::from_millis(args.hold_ms),
            no_audio: args.no_audio,
        }
    }

    /// Open audio, take over the terminal, and run until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);

        // The stream must outlive the UI loop; dropping it closes the device
        let (context, _stream, audio) = if self.no_audio {
            let info = AudioInfo::offline("disabled");
            (SoftwareContext::detached(FALLBACK_SAMPLE_RATE), None, info)
        } else {
            match open_output(self.master_gain, scope_tx) {
                Ok((context, stream, info)) => (context, Some(stream), info),
                Err(err) => {
                    warn!("running without audio: {err:#}");
                    let info = AudioInfo::offline("no output device");
                    (SoftwareContext::detached(FALLBACK_SAMPLE_RATE), None, info)
                }
            }
        };

        let session = Session::new(context)
            .with_policy(self.policy)
            .with_preset(self.preset);

        let mut terminal = ratatui::init();
        let enhanced = enter_input_modes();
        let mut app = UiApp::new(session, scope_rx, audio, self.hold, enhanced);

        let result = app.run(&mut terminal);

        leave_input_modes(enhanced);
        ratatui::restore();
        result
    }
}

/// Build the cpal output stream with the renderer inside its callback.
fn open_output(
    master_gain: f32,
    scope: Producer<f32>,
) -> EyreResult<(SoftwareContext, cpal::Stream, AudioInfo)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let device_name = device.name().unwrap_or_else(|_| "unknown device".into());

    let (context, renderer) = SoftwareContext::new(sample_rate, master_gain);
    let mut renderer = renderer.with_scope(scope);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    renderer.render_block(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;
    info!("audio output: {device_name}, {sample_rate} Hz, {channels} channels");

    let info = AudioInfo::live(device_name, sample_rate);
    Ok((context, stream, info))
}

/// Mouse capture, focus reports, and key-release reporting where the
/// terminal supports it. Returns whether key releases will be reported.
fn enter_input_modes() -> bool {
    if let Err(err) = execute!(stdout(), EnableMouseCapture, EnableFocusChange) {
        warn!("mouse capture unavailable: {err}");
    }

    let enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();

    if !enhanced {
        info!("terminal does not report key releases, notes use the hold timer");
    }
    enhanced
}

fn leave_input_modes(enhanced: bool) {
    if enhanced {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout(), DisableFocusChange, DisableMouseCapture);
}
