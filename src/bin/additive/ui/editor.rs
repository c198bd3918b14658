//! Harmonic bar editor widget
//!
//! One row band per harmonic, fundamental at the bottom. The same
//! `EditorLayout` is used to draw the bars and to map mouse positions back to
//! harmonics, so what you click is what you see.

use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_additive::{
    editor::{harmonic_label, is_guideline, EditorLayout},
    HarmonicSpectrum, NUM_HARMONICS,
};

/// Columns reserved for interval labels
const LABEL_COLS: u16 = 6;
const RIGHT_COLS: u16 = 1;

const BAR_FROM: (u8, u8, u8) = (0x8f, 0xa9, 0xdf);
const BAR_TO: (u8, u8, u8) = (0x5b, 0x7c, 0xbe);

#[derive(Default)]
pub struct EditorView {
    /// Inner area from the last render, in terminal cells
    inner: Rect,
}

impl EditorView {
    pub fn layout(&self) -> EditorLayout {
        let plot = self.inner.width.saturating_sub(LABEL_COLS + RIGHT_COLS);
        EditorLayout::new(LABEL_COLS as f32, plot as f32, self.inner.height as f32)
    }

    /// Editor coordinates for a press, if it landed inside the editor.
    pub fn pointer(&self, position: Position) -> Option<(f32, f32)> {
        self.inner
            .contains(position)
            .then(|| self.pointer_unclamped(position))
    }

    /// Editor coordinates for any position; drags may leave the widget.
    ///
    /// x is the right edge of the cell so the last plot column reads as full
    /// amplitude; y is the cell's vertical centre.
    pub fn pointer_unclamped(&self, position: Position) -> (f32, f32) {
        let x = position.x as f32 - self.inner.x as f32 + 1.0;
        let y = position.y as f32 - self.inner.y as f32 + 0.5;
        (x, y)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, spectrum: &HarmonicSpectrum) {
        let block = Block::default()
            .title(" Harmonics ")
            .borders(Borders::ALL);
        self.inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = self.layout();
        let plot = layout.plot_width as usize;
        let mut lines = Vec::with_capacity(self.inner.height as usize);
        let mut previous = None;

        for row in 0..self.inner.height {
            let (index, _) = layout.map_pointer(0.0, row as f32 + 0.5);
            let Some(index) = usize::try_from(index).ok().filter(|&i| i < NUM_HARMONICS) else {
                lines.push(Line::default());
                continue;
            };

            // Label only on the first row of a bar
            let label = if previous == Some(index) {
                String::new()
            } else {
                harmonic_label(index).into_owned()
            };
            previous = Some(index);

            let amplitude = spectrum.amplitude(index).unwrap_or(0.0);
            lines.push(bar_line(&label, index, amplitude, plot));
        }

        frame.render_widget(Paragraph::new(lines), self.inner);
    }
}

fn bar_line(label: &str, index: usize, amplitude: f32, plot: usize) -> Line<'static> {
    let label_style = if is_guideline(index) {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filled = ((amplitude * plot as f32).round() as usize).min(plot);
    let mut spans = Vec::with_capacity(filled + 2);
    spans.push(Span::styled(
        format!("{:>width$} ", label, width = LABEL_COLS as usize - 1),
        label_style,
    ));

    for col in 0..filled {
        let t = col as f32 / plot.max(1) as f32;
        spans.push(Span::styled("█", Style::default().fg(gradient(t))));
    }
    spans.push(Span::styled(
        "░".repeat(plot - filled),
        Style::default().fg(Color::Rgb(0x2a, 0x2e, 0x3a)),
    ));

    Line::from(spans)
}

fn gradient(t: f32) -> Color {
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb(
        lerp(BAR_FROM.0, BAR_TO.0),
        lerp(BAR_FROM.1, BAR_TO.1),
        lerp(BAR_FROM.2, BAR_TO.2),
    )
}
