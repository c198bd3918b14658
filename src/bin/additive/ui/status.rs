//! Status bar widget - audio device, levels, voices, and the last error

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_additive::synth::ReleasePolicy;

/// What the status bar knows about the output device
pub struct AudioInfo {
    pub device: String,
    pub sample_rate: Option<f32>,
}

impl AudioInfo {
    pub fn live(device: String, sample_rate: f32) -> Self {
        Self {
            device,
            sample_rate: Some(sample_rate),
        }
    }

    /// No stream; `reason` is shown in place of the device name
    pub fn offline(reason: &str) -> Self {
        Self {
            device: format!("audio {reason}"),
            sample_rate: None,
        }
    }
}

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    audio: &AudioInfo,
    stats: &AudioStats,
    voices: usize,
    policy: ReleasePolicy,
    message: Option<&str>,
) {
    let block = Block::default().title(" additive ").borders(Borders::ALL);

    let device_style = match audio.sample_rate {
        Some(_) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::Yellow),
    };

    let mut spans = vec![
        Span::styled(format!(" {}  ", audio.device), device_style),
    ];
    if let Some(rate) = audio.sample_rate {
        spans.push(Span::styled(
            format!("{:.1}kHz  ", rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.extend([
        Span::styled(
            format!("Voices: {voices}  "),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Release: {policy}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    if let Some(message) = message {
        spans.push(Span::styled(
            format!("  ! {message}"),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
