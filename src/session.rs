//! The instrument session.
//!
//! One `Session` owns everything the player can change: the spectrum, the
//! sounding voices and the editor's drag state. Input handlers translate raw
//! events into calls on it and read back `SessionEvent`s to know what to
//! redraw.
//!
//! Every spectrum edit ends in the same resynthesis step: rebuild the wave
//! once and push it to all active voices, so held notes change timbre while
//! they sound.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::{
    audio::AudioContext,
    editor::{keyboard, DrawState, EditorLayout},
    error::Result,
    harmonics::{HarmonicSpectrum, Preset, NUM_HARMONICS},
    synth::{ReleasePolicy, VoiceRegistry},
};

/// Notifications for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SpectrumChanged,
    VoiceActive(char),
    VoiceInactive(char),
}

pub struct Session<C: AudioContext> {
    context: C,
    spectrum: HarmonicSpectrum,
    voices: VoiceRegistry<char, C>,
    draw: DrawState,
    events: VecDeque<SessionEvent>,
}

impl<C: AudioContext> Session<C> {
    pub fn new(context: C) -> Self {
        Self {
            context,
            spectrum: HarmonicSpectrum::default(),
            voices: VoiceRegistry::new(),
            draw: DrawState::Idle,
            events: VecDeque::new(),
        }
    }

    pub fn with_policy(mut self, policy: ReleasePolicy) -> Self {
        self.voices = VoiceRegistry::new().with_policy(policy);
        self
    }

    /// Start from `preset` instead of a bare fundamental.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.spectrum = HarmonicSpectrum::from_preset(preset);
        self
    }

    // Editor -------------------------------------------------------------

    pub fn pointer_down(&mut self, x: f32, y: f32, layout: &EditorLayout) {
        self.resume_for_gesture();
        self.draw = DrawState::Dragging;
        self.paint(x, y, layout);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, layout: &EditorLayout) {
        if self.draw == DrawState::Dragging {
            self.paint(x, y, layout);
        }
    }

    /// Ends a drag wherever the pointer is, inside the editor or not.
    pub fn pointer_up(&mut self) {
        self.draw = DrawState::Idle;
    }

    /// Zero every harmonic.
    pub fn clear(&mut self) {
        self.resume_for_gesture();
        self.spectrum.reset();
        self.resynthesize();
    }

    pub fn load_preset(&mut self, name: &str) -> Result<()> {
        self.resume_for_gesture();
        self.spectrum.load_preset(name)?;
        self.resynthesize();
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.resume_for_gesture();
        self.spectrum.apply_preset(preset);
        self.resynthesize();
    }

    // Notes --------------------------------------------------------------

    /// Keyboard note-on. Auto-repeat and unmapped keys are ignored.
    pub fn key_down(&mut self, c: char, repeat: bool) -> Result<bool> {
        if repeat {
            return Ok(false);
        }
        match keyboard::lookup(c) {
            Some(binding) => self.note_on(binding.key, binding.frequency),
            None => Ok(false),
        }
    }

    pub fn key_up(&mut self, c: char) -> bool {
        match keyboard::lookup(c) {
            Some(binding) => self.note_off(binding.key),
            None => false,
        }
    }

    /// Start a voice for `id`. Returns `Ok(false)` if it was already sounding.
    pub fn note_on(&mut self, id: char, frequency: f32) -> Result<bool> {
        let started = self
            .voices
            .note_on(&mut self.context, &self.spectrum, id, frequency)?;
        if started {
            self.events.push_back(SessionEvent::VoiceActive(id));
        }
        Ok(started)
    }

    pub fn note_off(&mut self, id: char) -> bool {
        let released = self.voices.note_off(&mut self.context, id);
        if released {
            self.events.push_back(SessionEvent::VoiceInactive(id));
        }
        released
    }

    /// Release everything that is sounding (focus loss, shutdown).
    pub fn release_all(&mut self) {
        for id in self.voices.release_all(&mut self.context) {
            self.events.push_back(SessionEvent::VoiceInactive(id));
        }
    }

    // Queries ------------------------------------------------------------

    pub fn spectrum(&self) -> &HarmonicSpectrum {
        &self.spectrum
    }

    pub fn is_drawing(&self) -> bool {
        self.draw == DrawState::Dragging
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw
    }

    pub fn is_voice_active(&self, id: char) -> bool {
        self.voices.is_active(id)
    }

    /// Ids of the sounding voices, in no particular order.
    pub fn active_voices(&self) -> Vec<char> {
        self.voices.active_ids().collect()
    }

    pub fn voices(&self) -> &VoiceRegistry<char, C> {
        &self.voices
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Take every notification queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.events.drain(..)
    }

    // Internals ----------------------------------------------------------

    fn paint(&mut self, x: f32, y: f32, layout: &EditorLayout) {
        let (index, amplitude) = layout.map_pointer(x, y);
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= NUM_HARMONICS {
            return;
        }

        if self.spectrum.set_amplitude(index, amplitude).is_ok() {
            self.resynthesize();
        }
    }

    fn resynthesize(&mut self) {
        if !self.spectrum.take_dirty() {
            return;
        }
        let pushed = self
            .voices
            .rebroadcast_waveform(&mut self.context, &self.spectrum);
        if pushed > 0 {
            debug!("waveform pushed to {pushed} voices");
        }
        self.events.push_back(SessionEvent::SpectrumChanged);
    }

    // Editing works without sound, so a failed resume is not fatal here
    fn resume_for_gesture(&mut self) {
        if let Err(err) = self.context.resume_if_suspended() {
            warn!("could not resume audio: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::testing::{Call, MockContext},
        error::Error,
    };

    fn layout() -> EditorLayout {
        EditorLayout::for_canvas(640.0, 320.0)
    }

    fn events(session: &mut Session<MockContext>) -> Vec<SessionEvent> {
        session.drain_events().collect()
    }

    #[test]
    fn starts_from_the_fundamental() {
        let session = Session::new(MockContext::new());
        assert_eq!(session.spectrum().amplitude(0), Some(1.0));
        assert!(session.spectrum().iter().skip(1).all(|a| a == 0.0));
        assert!(!session.is_drawing());
    }

    #[test]
    fn drag_paints_until_pointer_up() {
        let mut session = Session::new(MockContext::new());
        let l = layout();

        session.pointer_down(45.0 + 145.0, 310.0, &l);
        assert!(session.is_drawing());
        assert_eq!(session.spectrum().amplitude(0), Some(0.25));

        // Drag up into the next bar
        session.pointer_move(45.0 + 435.0, 290.0, &l);
        assert_eq!(session.spectrum().amplitude(1), Some(0.75));

        session.pointer_up();
        session.pointer_move(45.0, 270.0, &l);
        assert_eq!(session.spectrum().amplitude(2), Some(0.0));
        assert!(!session.is_drawing());

        assert_eq!(
            events(&mut session),
            vec![SessionEvent::SpectrumChanged, SessionEvent::SpectrumChanged]
        );
    }

    #[test]
    fn move_without_press_does_nothing() {
        let mut session = Session::new(MockContext::new());
        session.pointer_move(300.0, 10.0, &layout());

        assert_eq!(session.spectrum().amplitude(15), Some(0.0));
        assert!(events(&mut session).is_empty());
    }

    #[test]
    fn pointer_outside_the_bars_is_ignored() {
        let mut session = Session::new(MockContext::new());
        let before = session.spectrum().amplitudes();

        session.pointer_down(300.0, -5.0, &layout());
        session.pointer_move(300.0, 400.0, &layout());

        assert_eq!(session.spectrum().amplitudes(), before);
        assert!(events(&mut session).is_empty());
        // Still a drag; it may come back into range
        assert!(session.is_drawing());
    }

    #[test]
    fn gestures_resume_the_context() {
        let mut session = Session::new(MockContext::new());
        session.pointer_down(300.0, 10.0, &layout());
        session.pointer_up();
        session.clear();

        assert_eq!(session.context().count(|c| *c == Call::Resume), 1);
    }

    #[test]
    fn editing_without_audio_still_works() {
        let mut ctx = MockContext::new();
        ctx.unavailable = true;
        let mut session = Session::new(ctx);

        session.apply_preset(Preset::Organ);

        assert_eq!(session.spectrum().amplitude(1), Some(0.8));
        assert_eq!(events(&mut session), vec![SessionEvent::SpectrumChanged]);
        assert!(session.key_down('a', false).is_err());
        assert!(!session.is_voice_active('a'));
    }

    #[test]
    fn keys_start_and_stop_voices() {
        let mut session = Session::new(MockContext::new());

        assert!(session.key_down('A', false).unwrap());
        assert!(!session.key_down('a', true).unwrap());
        assert!(!session.key_down('z', false).unwrap());
        assert!(session.is_voice_active('a'));

        assert!(session.key_up('a'));
        assert!(!session.key_up('a'));

        assert_eq!(
            events(&mut session),
            vec![
                SessionEvent::VoiceActive('a'),
                SessionEvent::VoiceInactive('a')
            ]
        );
    }

    #[test]
    fn edits_reach_held_notes() {
        let mut session = Session::new(MockContext::new());
        session.key_down('a', false).unwrap();
        session.key_down('d', false).unwrap();
        session.context().clear_calls();

        session.pointer_down(400.0, 10.0, &layout());
        session.pointer_move(500.0, 10.0, &layout());

        assert_eq!(session.context().count(|c| matches!(c, Call::SetWave(_))), 4);
        assert_eq!(session.active_voices().len(), 2);
    }

    #[test]
    fn unknown_preset_changes_nothing() {
        let mut session = Session::new(MockContext::new());
        let err = session.load_preset("kazoo").unwrap_err();

        assert_eq!(err, Error::UnknownPreset("kazoo".into()));
        assert_eq!(session.spectrum().amplitude(0), Some(1.0));
        assert!(events(&mut session).is_empty());
    }

    #[test]
    fn release_all_reports_each_voice() {
        let mut session = Session::new(MockContext::new());
        session.key_down('a', false).unwrap();
        session.key_down('k', false).unwrap();
        events(&mut session);

        session.release_all();

        let mut released = events(&mut session);
        released.sort_by_key(|e| match e {
            SessionEvent::VoiceInactive(c) => *c,
            _ => ' ',
        });
        assert_eq!(
            released,
            vec![
                SessionEvent::VoiceInactive('a'),
                SessionEvent::VoiceInactive('k')
            ]
        );
        assert!(session.active_voices().is_empty());
    }
}
