use std::{collections::HashMap, fmt, fmt::Debug, hash::Hash, str::FromStr, sync::Arc};

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    audio::{AudioContext, OscillatorNode},
    error::{Error, Result},
    harmonics::{waveform, HarmonicSpectrum},
    synth::{
        envelope::EnvelopeShape,
        voice::{Voice, VoiceState},
    },
};

/// What to do with a voice that is still fading out when its key is pressed
/// again.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Leave the old tail alone; old and new voice sound together.
    #[default]
    Overlap,
    /// Cut the old tail with a few milliseconds of fade.
    Choke,
}

impl ReleasePolicy {
    pub fn name(self) -> &'static str {
        match self {
            ReleasePolicy::Overlap => "overlap",
            ReleasePolicy::Choke => "choke",
        }
    }
}

impl FromStr for ReleasePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlap" => Ok(ReleasePolicy::Overlap),
            "choke" => Ok(ReleasePolicy::Choke),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type VoiceOf<C> = Voice<<C as AudioContext>::Oscillator, <C as AudioContext>::Gain>;

/// Polyphonic note lifecycle keyed by input identifier.
///
/// At most one active voice per id. A second note-on for an active id does
/// nothing; the first press wins until it is released. Note-off removes the
/// id immediately, while the sound keeps fading on the audio clock, so the
/// same key can start a fresh voice before the old tail has finished.
///
/// Released voices are remembered in a short releasing list until their stop
/// time passes. That is what lets `ReleasePolicy::Choke` reach the old tail.
pub struct VoiceRegistry<K, C: AudioContext> {
    active: HashMap<K, VoiceOf<C>>,
    releasing: Vec<(K, VoiceOf<C>)>,
    shape: EnvelopeShape,
    policy: ReleasePolicy,
}

impl<K, C> VoiceRegistry<K, C>
where
    K: Copy + Eq + Hash + Debug,
    C: AudioContext,
{
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            releasing: Vec::new(),
            shape: EnvelopeShape::DEFAULT,
            policy: ReleasePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_shape(mut self, shape: EnvelopeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub fn shape(&self) -> &EnvelopeShape {
        &self.shape
    }

    /// Start a voice for `id`. Returns `Ok(false)` when `id` is already
    /// sounding.
    ///
    /// On `AudioUnavailable` the id stays idle.
    pub fn note_on(
        &mut self,
        ctx: &mut C,
        spectrum: &HarmonicSpectrum,
        id: K,
        frequency: f32,
    ) -> Result<bool> {
        self.prune(ctx.current_time());
        if self.active.contains_key(&id) {
            return Ok(false);
        }

        ctx.resume_if_suspended()?;
        let mut oscillator = ctx.create_oscillator()?;
        let mut gain = match ctx.create_gain() {
            Ok(gain) => gain,
            Err(err) => {
                oscillator.stop(ctx.current_time());
                return Err(err);
            }
        };

        let wave = ctx.create_periodic_wave(&waveform::build(spectrum));
        oscillator.set_periodic_wave(wave);
        oscillator.set_frequency(frequency);

        let now = ctx.current_time();
        if self.policy == ReleasePolicy::Choke {
            self.choke(id, now);
        }

        self.shape.schedule_attack(&mut gain, now);
        ctx.connect(&oscillator, &gain);
        ctx.connect_to_output(&gain);
        oscillator.start();

        debug!("note on {id:?} at {frequency:.2} Hz ({now:.3}s)");
        self.active
            .insert(id, Voice::new(oscillator, gain, frequency, now));
        Ok(true)
    }

    /// Release `id`. Returns false when it was not sounding.
    pub fn note_off(&mut self, ctx: &mut C, id: K) -> bool {
        let now = ctx.current_time();
        self.prune(now);

        let Some(mut voice) = self.active.remove(&id) else {
            return false;
        };

        let (oscillator, gain) = voice.nodes_mut();
        let stop_at = self.shape.schedule_release(gain, now);
        oscillator.stop(stop_at);
        voice.mark_stopping(stop_at);

        debug!("note off {id:?} ({now:.3}s, silent at {stop_at:.3}s)");
        self.releasing.push((id, voice));
        true
    }

    /// Release every active voice. Returns the ids that were released.
    pub fn release_all(&mut self, ctx: &mut C) -> Vec<K> {
        let ids: Vec<K> = self.active.keys().copied().collect();
        for &id in &ids {
            self.note_off(ctx, id);
        }
        ids
    }

    /// Push the spectrum's waveform to every active voice. Envelopes, phase
    /// and running state are untouched. Returns the number of voices updated.
    pub fn rebroadcast_waveform(&mut self, ctx: &mut C, spectrum: &HarmonicSpectrum) -> usize {
        self.prune(ctx.current_time());
        if self.active.is_empty() {
            return 0;
        }

        let wave = ctx.create_periodic_wave(&waveform::build(spectrum));
        for voice in self.active.values_mut() {
            let (oscillator, _) = voice.nodes_mut();
            oscillator.set_periodic_wave(Arc::clone(&wave));
        }
        self.active.len()
    }

    pub fn is_active(&self, id: K) -> bool {
        self.active.contains_key(&id)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = K> + '_ {
        self.active.keys().copied()
    }

    pub fn voice(&self, id: K) -> Option<&VoiceOf<C>> {
        self.active.get(&id)
    }

    pub fn state(&self, id: K, now: f64) -> Option<VoiceState> {
        self.active
            .get(&id)
            .map(|voice| voice.state_at(now, &self.shape))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Voices still fading out, as of the last registry call.
    pub fn releasing_len(&self) -> usize {
        self.releasing.len()
    }

    fn prune(&mut self, now: f64) {
        self.releasing.retain(|(_, voice)| !voice.is_finished(now));
    }

    fn choke(&mut self, id: K, now: f64) {
        for (_, voice) in self.releasing.iter_mut().filter(|(key, _)| *key == id) {
            let (oscillator, gain) = voice.nodes_mut();
            let stop_at = self.shape.schedule_choke(gain, now);
            oscillator.stop(stop_at);
            voice.mark_stopping(stop_at);
            debug!("choked release tail of {id:?}");
        }
    }
}

impl<K, C> Default for VoiceRegistry<K, C>
where
    K: Copy + Eq + Hash + Debug,
    C: AudioContext,
{
    fn default() -> Self {
        Self::new()
    }
}
