//! Piano keyboard widget
//!
//! ```text
//!  ┌─────┬─────┬─────┬───
//!  │    ███   ███    │
//!  │    ███   ███    │
//!  │    ███   ███    │
//!  │     │     │     │
//!  │  A  │  S  │  D  │ ...
//! ```
//!
//! Drawn and hit-tested from the same geometry: white keys are
//! `WHITE_WIDTH` columns, black keys straddle the divider to their left and
//! cover the top `BLACK_ROWS` rows.

use std::collections::HashSet;

use ratatui::{
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_additive::editor::keyboard::{self, KeyBinding};

const WHITE_WIDTH: u16 = 6;
const BLACK_WIDTH: u16 = 3;
const BLACK_ROWS: u16 = 3;

const LIT: Color = Color::Rgb(0xf2, 0xc1, 0x4e);

/// Key under `position`, given the inner area the piano was drawn into.
pub fn key_at(area: Rect, position: Position) -> Option<&'static KeyBinding> {
    if !area.contains(position) {
        return None;
    }
    let col = position.x - area.x;
    let row = position.y - area.y;

    if row < BLACK_ROWS {
        let black = keyboard::black_keys().find(|(whites, _)| {
            let start = (*whites as u16 * WHITE_WIDTH).saturating_sub(2);
            (start..start + BLACK_WIDTH).contains(&col)
        });
        if let Some((_, binding)) = black {
            return Some(binding);
        }
    }

    keyboard::white_keys().nth((col / WHITE_WIDTH) as usize)
}

/// Render the keyboard, highlighting sounding keys. Returns the inner area
/// used for hit-testing.
pub fn render_piano(frame: &mut Frame, area: Rect, lit: &HashSet<char>) -> Rect {
    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let whites = keyboard::white_keys().count() as u16;
    let inner = Rect {
        width: inner.width.min(whites * WHITE_WIDTH),
        ..inner
    };

    let lines: Vec<Line> = (0..inner.height)
        .map(|row| {
            let spans: Vec<Span> = (0..inner.width)
                .map(|col| key_cell(inner, col, row, lit))
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
    inner
}

fn key_cell(area: Rect, col: u16, row: u16, lit: &HashSet<char>) -> Span<'static> {
    let position = Position::new(area.x + col, area.y + row);
    let Some(binding) = key_at(area, position) else {
        return Span::raw(" ");
    };
    let on = lit.contains(&binding.key);

    if binding.is_black {
        let fg = if on { LIT } else { Color::Rgb(0x22, 0x22, 0x28) };
        return Span::styled("█", Style::default().fg(fg));
    }

    let bg = if on { LIT } else { Color::Rgb(0xe8, 0xe8, 0xe8) };
    let style = Style::default().fg(Color::Black).bg(bg);
    let within = col % WHITE_WIDTH;

    if within == WHITE_WIDTH - 1 {
        Span::styled("│", style.fg(Color::DarkGray))
    } else if row + 1 == area.height && within == WHITE_WIDTH / 2 - 1 {
        Span::styled(binding.label, style)
    } else {
        Span::styled(" ", style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(2, 30, 60, 5)
    }

    fn key(col: u16, row: u16) -> Option<char> {
        key_at(area(), Position::new(2 + col, 30 + row)).map(|b| b.key)
    }

    #[test]
    fn white_keys_fill_the_lower_rows() {
        assert_eq!(key(0, 4), Some('a'));
        assert_eq!(key(5, 4), Some('a'));
        assert_eq!(key(6, 4), Some('s'));
        assert_eq!(key(59, 4), Some(';'));
    }

    #[test]
    fn black_keys_straddle_the_divider() {
        assert_eq!(key(4, 0), Some('w'));
        assert_eq!(key(6, 2), Some('w'));
        assert_eq!(key(7, 0), Some('s'));
        // E to F has no black key
        assert_eq!(key(17, 0), Some('d'));
        assert_eq!(key(4, 3), Some('a'));
    }

    #[test]
    fn outside_the_keyboard() {
        assert_eq!(key(0, 5), None);
        assert_eq!(key_at(area(), Position::new(1, 31)), None);
    }
}
