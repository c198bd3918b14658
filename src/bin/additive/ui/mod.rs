//! TUI module for additive
//!
//! Translates terminal input into `Session` calls and draws the spectrum
//! editor, piano, waveform views and status line.

mod editor;
mod piano;
mod status;
mod waveform;

use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use saavy_additive::{
    audio::software::SoftwareContext,
    dsp::WavetableBuilder,
    editor::keyboard,
    harmonics::waveform as harmonic_waveform,
    Preset, Session, SessionEvent,
};

pub use status::AudioInfo;

use editor::EditorView;
use piano::{key_at, render_piano};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Points drawn for one period of the current waveform
const CYCLE_POINTS: usize = 256;

pub struct UiApp {
    session: Session<SoftwareContext>,
    /// Ring buffer receiver for rendered samples
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    /// One period of the current spectrum, redrawn on every edit
    cycle: Vec<f32>,
    wavetables: WavetableBuilder,
    audio: AudioInfo,
    /// Keys currently down, with a release deadline when the terminal
    /// cannot tell us about releases
    held: HashMap<char, Option<Instant>>,
    releases_reported: bool,
    hold: Duration,
    /// Piano key held with the mouse
    mouse_note: Option<char>,
    /// Sounding voices, as reported by the session
    lit: HashSet<char>,
    /// Last problem worth showing the user
    message: Option<String>,
    editor: EditorView,
    piano_area: Rect,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        session: Session<SoftwareContext>,
        scope_rx: Consumer<f32>,
        audio: AudioInfo,
        hold: Duration,
        releases_reported: bool,
    ) -> Self {
        let mut app = Self {
            session,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            cycle: Vec::with_capacity(CYCLE_POINTS),
            wavetables: WavetableBuilder::new(),
            audio,
            held: HashMap::new(),
            releases_reported,
            hold,
            mouse_note: None,
            lit: HashSet::new(),
            message: None,
            editor: EditorView::default(),
            piano_area: Rect::default(),
            should_quit: false,
        };
        app.refresh_cycle();
        app
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.session.context_mut().collect_garbage();
            self.expire_held_keys(Instant::now());

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::FocusLost => self.release_everything(),
                    _ => {}
                }
            }
            self.consume_events();
        }

        self.session.release_all();
        Ok(())
    }

    /// Keep the most recent VIS_BUFFER_SIZE samples from the audio thread
    fn poll_scope(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
            received = true;
        }

        if received && self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let KeyCode::Char(c) = key.code else {
            if key.kind == KeyEventKind::Press {
                self.handle_command(key.code);
            }
            return;
        };
        let c = c.to_ascii_lowercase();

        if keyboard::lookup(c).is_none() {
            if key.kind == KeyEventKind::Press {
                if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                    self.should_quit = true;
                } else {
                    self.handle_command(key.code);
                }
            }
            return;
        }

        match key.kind {
            KeyEventKind::Press => self.press_note_key(c),
            KeyEventKind::Repeat => self.extend_hold(c),
            KeyEventKind::Release => {
                self.releases_reported = true;
                self.held.remove(&c);
                self.session.key_up(c);
            }
        }
    }

    fn press_note_key(&mut self, c: char) {
        // Terminals without release reporting send auto-repeat as presses
        if self.held.contains_key(&c) {
            self.extend_hold(c);
            return;
        }

        let deadline = self.deadline();
        match self.session.key_down(c, false) {
            Ok(_) => {
                self.held.insert(c, deadline);
            }
            Err(err) => {
                warn!("note on '{c}' failed: {err}");
                self.message = Some(err.to_string());
            }
        }
    }

    fn extend_hold(&mut self, c: char) {
        let deadline = self.deadline();
        if let Some(slot) = self.held.get_mut(&c) {
            *slot = deadline;
        }
    }

    fn deadline(&self) -> Option<Instant> {
        (!self.releases_reported).then(|| Instant::now() + self.hold)
    }

    fn expire_held_keys(&mut self, now: Instant) {
        let expired: Vec<char> = self
            .held
            .iter()
            .filter(|(_, deadline)| deadline.is_some_and(|d| d <= now))
            .map(|(&c, _)| c)
            .collect();

        for c in expired {
            self.held.remove(&c);
            self.session.key_up(c);
        }
    }

    fn handle_command(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.release_everything(),
            KeyCode::Char('c') | KeyCode::Backspace => self.session.clear(),
            KeyCode::Char(digit @ '1'..='6') => {
                let index = digit as usize - '1' as usize;
                if let Some(&preset) = Preset::ALL.get(index) {
                    self.session.apply_preset(preset);
                    self.message = None;
                }
            }
            _ => {}
        }
    }

    /// Release every voice and forget which keys we believed were down, so
    /// the next press of any key starts a note.
    fn release_everything(&mut self) {
        self.held.clear();
        self.mouse_note = None;
        self.session.release_all();
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((x, y)) = self.editor.pointer(position) {
                    let layout = self.editor.layout();
                    self.session.pointer_down(x, y, &layout);
                } else if let Some(binding) = key_at(self.piano_area, position) {
                    self.mouse_note = Some(binding.key);
                    if let Err(err) = self.session.note_on(binding.key, binding.frequency) {
                        warn!("note on '{}' failed: {err}", binding.key);
                        self.message = Some(err.to_string());
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.session.is_drawing() {
                    let (x, y) = self.editor.pointer_unclamped(position);
                    let layout = self.editor.layout();
                    self.session.pointer_move(x, y, &layout);
                }

                // Sliding off a piano key releases it
                if let Some(id) = self.mouse_note {
                    let under = key_at(self.piano_area, position).map(|b| b.key);
                    if under != Some(id) {
                        self.session.note_off(id);
                        self.mouse_note = None;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.session.pointer_up();
                if let Some(id) = self.mouse_note.take() {
                    self.session.note_off(id);
                }
            }
            _ => {}
        }
    }

    fn consume_events(&mut self) {
        let mut spectrum_changed = false;
        for event in self.session.drain_events() {
            match event {
                SessionEvent::SpectrumChanged => spectrum_changed = true,
                SessionEvent::VoiceActive(id) => {
                    self.lit.insert(id);
                }
                SessionEvent::VoiceInactive(id) => {
                    self.lit.remove(&id);
                }
            }
        }
        if spectrum_changed {
            self.refresh_cycle();
        }
    }

    fn refresh_cycle(&mut self) {
        let wave = self
            .wavetables
            .build(&harmonic_waveform::build(self.session.spectrum()));
        self.cycle.clear();
        self.cycle.extend(
            (0..CYCLE_POINTS).map(|i| wave.sample(i as f64 / CYCLE_POINTS as f64)),
        );
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, editor, waveforms, piano, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(18),    // Harmonic editor
                Constraint::Length(8),  // Waveforms
                Constraint::Length(7),  // Piano
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.scope);
        render_status(
            frame,
            chunks[0],
            &self.audio,
            &stats,
            self.lit.len(),
            self.session.voices().policy(),
            self.message.as_deref(),
        );

        self.editor.render(frame, chunks[1], self.session.spectrum());

        let views = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[2]);
        render_waveform(frame, views[0], " One cycle ", &self.cycle, Color::LightBlue);
        render_waveform(frame, views[1], " Output ", &self.scope, Color::Cyan);

        self.piano_area = render_piano(frame, chunks[3], &self.lit);

        let help = Paragraph::new(
            " [Keys A-;] Play  [Mouse] Draw harmonics / play piano  [1-6] Presets  [C] Clear  [Space] Release  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use rtrb::RingBuffer;
    use saavy_additive::audio::software::Renderer;

    use super::*;

    fn app(releases_reported: bool) -> (UiApp, Renderer) {
        let (context, renderer) = SoftwareContext::new(48_000.0, 0.5);
        let (_scope_tx, scope_rx) = RingBuffer::<f32>::new(16);
        let app = UiApp::new(
            Session::new(context),
            scope_rx,
            AudioInfo::offline("test"),
            Duration::from_millis(300),
            releases_reported,
        );
        (app, renderer)
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn key_plays_again_after_focus_loss() {
        let (mut app, _renderer) = app(true);

        app.handle_key(press('a'));
        assert!(app.session.is_voice_active('a'));

        // The release happens in another window and is never reported
        app.release_everything();
        assert!(!app.session.is_voice_active('a'));
        assert!(app.held.is_empty());

        app.handle_key(press('a'));
        assert!(app.session.is_voice_active('a'));
    }

    #[test]
    fn space_release_does_not_swallow_the_next_press() {
        let (mut app, _renderer) = app(false);

        app.handle_key(press('s'));
        app.handle_key(press(' '));
        assert!(!app.session.is_voice_active('s'));

        // Well inside the hold window
        app.handle_key(press('s'));
        assert!(app.session.is_voice_active('s'));
    }

    #[test]
    fn auto_repeat_press_extends_the_hold() {
        let (mut app, _renderer) = app(false);

        app.handle_key(press('d'));
        let first = app.held[&'d'];
        app.handle_key(press('d'));

        assert!(app.session.is_voice_active('d'));
        assert!(app.held[&'d'] >= first);
        assert_eq!(app.session.voices().len(), 1);
    }
}
