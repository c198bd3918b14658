//! Software audio backend.
//!
//! Split in two halves that meet at a lock-free command queue:
//!
//! - `SoftwareContext` lives on the control (UI) thread and implements
//!   `AudioContext`. Node handles are ids plus a copy of whatever state the
//!   control side needs to answer questions (frequency, gain automation).
//! - `Renderer` lives inside the audio callback. It owns the actual
//!   oscillators and gain stages, applies queued commands at the top of each
//!   block, and advances the shared sample clock.
//!
//! Gain automation is deterministic, so both halves keep an identical
//! `AutomationTimeline` and the control side can read "the current gain"
//! without asking the audio thread.
//!
//! The renderer never allocates or frees. Nodes are built (timelines
//! reserved) on the control side and moved in through the command queue;
//! replaced waves and collected nodes go back through a second queue and
//! are dropped by `SoftwareContext::collect_garbage`, which every `create_*`
//! call runs first. The live node count is capped at the renderer's
//! reserved capacity.
//!
//! # Example
//!
//! ```ignore
//! let (mut ctx, mut renderer) = SoftwareContext::new(48_000.0, 0.5);
//! ctx.resume()?;
//! // ... create nodes through the AudioContext trait ...
//! let mut block = vec![0.0f32; 256];
//! renderer.render_block(&mut block); // normally called from the cpal callback
//! ```

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use log::{debug, warn};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use super::{AudioContext, ContextState, GainNode, OscillatorNode};
use crate::{
    dsp::{automation::AutomationEvent, AutomationTimeline, PeriodicWave, WavetableBuilder},
    error::{Error, Result},
    harmonics::WaveformDescriptor,
};

const COMMAND_QUEUE_SIZE: usize = 1024;
const RETIRED_QUEUE_SIZE: usize = 2 * COMMAND_QUEUE_SIZE;
/// Oscillators (and gains) alive at once
pub const NODE_CAPACITY: usize = 64;
/// Automation events a gain can hold before its timeline grows
const TIMELINE_CAPACITY: usize = 16;

pub type NodeId = u32;

enum Command {
    AddOscillator(OscillatorVoice),
    AddGain(GainStage),
    SetWave(NodeId, Arc<PeriodicWave>),
    SetFrequency(NodeId, f32),
    Start(NodeId),
    Stop(NodeId, f64),
    Schedule(NodeId, AutomationEvent),
    Cancel(NodeId, f64),
    Connect { oscillator: NodeId, gain: NodeId },
    ConnectToOutput(NodeId),
}

/// Heap-owning values the renderer hands back to be freed off the audio
/// thread.
enum Retired {
    Wave(Arc<PeriodicWave>),
    Oscillator(OscillatorVoice),
    Gain(GainStage),
}

/// Sample clock shared by both halves. Only the renderer advances it.
#[derive(Clone)]
struct Clock {
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl Clock {
    fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}

type CommandQueue = Rc<RefCell<Producer<Command>>>;

fn send(queue: &CommandQueue, command: Command) -> Result<()> {
    let mut tx = queue.borrow_mut();
    if tx.is_abandoned() {
        return Err(Error::AudioUnavailable("renderer stopped"));
    }
    match tx.push(command) {
        Ok(()) => Ok(()),
        Err(PushError::Full(_)) => Err(Error::AudioUnavailable("command queue full")),
    }
}

/// For handle methods that cannot report failure through the trait.
fn send_or_warn(queue: &CommandQueue, command: Command) {
    if let Err(err) = send(queue, command) {
        warn!("dropped audio command: {err}");
    }
}

/// Control-side half of the software backend.
pub struct SoftwareContext {
    clock: Clock,
    running: Arc<AtomicBool>,
    queue: CommandQueue,
    retired: Consumer<Retired>,
    live_oscillators: usize,
    live_gains: usize,
    next_id: NodeId,
    wavetables: WavetableBuilder,
}

impl SoftwareContext {
    /// Create a context and the renderer that must be driven from the audio
    /// callback. The context starts suspended.
    pub fn new(sample_rate: f32, master_gain: f32) -> (Self, Renderer) {
        let (tx, rx) = RingBuffer::<Command>::new(COMMAND_QUEUE_SIZE);
        let (retired_tx, retired_rx) = RingBuffer::<Retired>::new(RETIRED_QUEUE_SIZE);
        let clock = Clock::new(sample_rate);
        let running = Arc::new(AtomicBool::new(false));

        let context = Self {
            clock: clock.clone(),
            running: Arc::clone(&running),
            queue: Rc::new(RefCell::new(tx)),
            retired: retired_rx,
            live_oscillators: 0,
            live_gains: 0,
            next_id: 0,
            wavetables: WavetableBuilder::new(),
        };

        let renderer = Renderer {
            commands: rx,
            retired: retired_tx,
            clock,
            running,
            master_gain: master_gain.clamp(0.0, 1.0),
            oscillators: Vec::with_capacity(NODE_CAPACITY),
            gains: Vec::with_capacity(NODE_CAPACITY),
            scope: None,
        };

        (context, renderer)
    }

    /// A context with no renderer behind it. Editing still works; every
    /// attempt to make sound reports `AudioUnavailable`.
    pub fn detached(sample_rate: f32) -> Self {
        let (context, _renderer) = Self::new(sample_rate, 0.0);
        context
    }

    pub fn is_detached(&self) -> bool {
        self.queue.borrow().is_abandoned()
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate
    }

    pub fn suspend(&mut self) {
        self.running.store(false, Ordering::Release);
    }

    /// Oscillators created and not yet collected by the renderer.
    pub fn live_oscillators(&self) -> usize {
        self.live_oscillators
    }

    /// Free whatever the renderer has let go of. Returns how many values
    /// were dropped.
    pub fn collect_garbage(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(retired) = self.retired.pop() {
            match retired {
                Retired::Wave(wave) => drop(wave),
                Retired::Oscillator(osc) => {
                    drop(osc);
                    self.live_oscillators -= 1;
                }
                Retired::Gain(gain) => {
                    drop(gain);
                    self.live_gains -= 1;
                }
            }
            freed += 1;
        }
        freed
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl AudioContext for SoftwareContext {
    type Oscillator = SoftwareOscillator;
    type Gain = SoftwareGain;

    fn current_time(&self) -> f64 {
        self.clock.now()
    }

    fn state(&self) -> ContextState {
        if self.running.load(Ordering::Acquire) {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    fn resume(&mut self) -> Result<()> {
        if self.is_detached() {
            return Err(Error::AudioUnavailable("no output stream"));
        }
        self.running.store(true, Ordering::Release);
        debug!("audio context resumed at {:.3}s", self.clock.now());
        Ok(())
    }

    fn create_oscillator(&mut self) -> Result<SoftwareOscillator> {
        self.collect_garbage();
        if self.live_oscillators >= NODE_CAPACITY {
            return Err(Error::AudioUnavailable("too many voices"));
        }

        let id = self.allocate_id();
        send(&self.queue, Command::AddOscillator(OscillatorVoice::new(id)))?;
        self.live_oscillators += 1;

        Ok(SoftwareOscillator {
            id,
            frequency: 440.0,
            queue: Rc::clone(&self.queue),
        })
    }

    fn create_gain(&mut self) -> Result<SoftwareGain> {
        self.collect_garbage();
        if self.live_gains >= NODE_CAPACITY {
            return Err(Error::AudioUnavailable("too many voices"));
        }

        let id = self.allocate_id();
        send(&self.queue, Command::AddGain(GainStage::new(id)))?;
        self.live_gains += 1;

        Ok(SoftwareGain {
            id,
            timeline: AutomationTimeline::new(1.0),
            clock: self.clock.clone(),
            queue: Rc::clone(&self.queue),
        })
    }

    fn create_periodic_wave(&mut self, descriptor: &WaveformDescriptor) -> Arc<PeriodicWave> {
        self.collect_garbage();
        Arc::new(self.wavetables.build(descriptor))
    }

    fn connect(&mut self, oscillator: &SoftwareOscillator, gain: &SoftwareGain) {
        send_or_warn(
            &self.queue,
            Command::Connect {
                oscillator: oscillator.id,
                gain: gain.id,
            },
        );
    }

    fn connect_to_output(&mut self, gain: &SoftwareGain) {
        send_or_warn(&self.queue, Command::ConnectToOutput(gain.id));
    }
}

pub struct SoftwareOscillator {
    id: NodeId,
    frequency: f32,
    queue: CommandQueue,
}

impl SoftwareOscillator {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl OscillatorNode for SoftwareOscillator {
    fn set_periodic_wave(&mut self, wave: Arc<PeriodicWave>) {
        send_or_warn(&self.queue, Command::SetWave(self.id, wave));
    }

    fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        send_or_warn(&self.queue, Command::SetFrequency(self.id, hz));
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn start(&mut self) {
        send_or_warn(&self.queue, Command::Start(self.id));
    }

    fn stop(&mut self, time: f64) {
        send_or_warn(&self.queue, Command::Stop(self.id, time));
    }
}

pub struct SoftwareGain {
    id: NodeId,
    /// Mirror of the renderer's timeline for `value()` reads
    timeline: AutomationTimeline,
    clock: Clock,
    queue: CommandQueue,
}

impl SoftwareGain {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn schedule(&mut self, event: AutomationEvent) {
        self.timeline.apply(event);
        send_or_warn(&self.queue, Command::Schedule(self.id, event));
    }
}

impl GainNode for SoftwareGain {
    fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.schedule(AutomationEvent::SetValue { value, time });
    }

    fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.schedule(AutomationEvent::LinearRamp { value, time });
    }

    fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.schedule(AutomationEvent::ExponentialRamp { value, time });
    }

    fn cancel_scheduled_values(&mut self, time: f64) {
        self.timeline.cancel_scheduled_values(time);
        send_or_warn(&self.queue, Command::Cancel(self.id, time));
    }

    fn value(&self) -> f32 {
        self.timeline.value_at(self.clock.now())
    }
}

struct OscillatorVoice {
    id: NodeId,
    wave: Option<Arc<PeriodicWave>>,
    frequency: f32,
    phase: f64,
    playing: bool,
    stop_at: Option<f64>,
    output: Option<NodeId>,
}

impl OscillatorVoice {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            wave: None,
            frequency: 440.0,
            phase: 0.0,
            playing: false,
            stop_at: None,
            output: None,
        }
    }
}

struct GainStage {
    id: NodeId,
    timeline: AutomationTimeline,
    to_output: bool,
}

impl GainStage {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            timeline: AutomationTimeline::with_capacity(1.0, TIMELINE_CAPACITY),
            to_output: false,
        }
    }
}

/// Audio-thread half of the software backend.
pub struct Renderer {
    commands: Consumer<Command>,
    retired: Producer<Retired>,
    clock: Clock,
    running: Arc<AtomicBool>,
    master_gain: f32,
    oscillators: Vec<OscillatorVoice>,
    gains: Vec<GainStage>,
    scope: Option<Producer<f32>>,
}

impl Renderer {
    /// Mirror every rendered (mono) sample into `scope`, dropping samples
    /// when the consumer falls behind.
    pub fn with_scope(mut self, scope: Producer<f32>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate
    }

    /// Oscillators that have been created and not yet reached their stop time.
    pub fn active_oscillators(&self) -> usize {
        self.oscillators.len()
    }

    pub fn active_gains(&self) -> usize {
        self.gains.len()
    }

    /// Render one mono block. Silent, with the clock held, while suspended.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.drain_commands();
        out.fill(0.0);

        if !self.running.load(Ordering::Acquire) {
            return;
        }

        let sample_rate = self.clock.sample_rate as f64;
        let start = self.clock.frames();
        let gains = &self.gains;

        for osc in self.oscillators.iter_mut().filter(|o| o.playing) {
            let gain = osc
                .output
                .and_then(|id| gains.iter().find(|g| g.id == id && g.to_output));
            let step = osc.frequency as f64 / sample_rate;

            for (i, sample) in out.iter_mut().enumerate() {
                let time = (start + i as u64) as f64 / sample_rate;
                if osc.stop_at.is_some_and(|stop| time >= stop) {
                    osc.playing = false;
                    break;
                }

                if let (Some(wave), Some(gain)) = (&osc.wave, gain) {
                    *sample += wave.sample(osc.phase) * gain.timeline.value_at(time);
                }
                osc.phase = (osc.phase + step).fract();
            }
        }

        for sample in out.iter_mut() {
            *sample *= self.master_gain;
        }

        self.clock.advance(out.len());
        let now = (start + out.len() as u64) as f64 / sample_rate;
        self.collect_stopped(now);

        if let Some(scope) = self.scope.as_mut() {
            for &s in out.iter() {
                if let Err(PushError::Full(_)) = scope.push(s) {
                    break; // drop remainder if full
                }
            }
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            // Within reserved capacity: the context caps live nodes
            Command::AddOscillator(osc) => self.oscillators.push(osc),
            Command::AddGain(gain) => self.gains.push(gain),
            Command::SetWave(id, wave) => {
                let old = match self.oscillator_mut(id) {
                    Some(osc) => osc.wave.replace(wave),
                    None => Some(wave),
                };
                if let Some(old) = old {
                    self.retire(Retired::Wave(old));
                }
            }
            Command::SetFrequency(id, hz) => {
                if let Some(osc) = self.oscillator_mut(id) {
                    osc.frequency = hz;
                }
            }
            Command::Start(id) => {
                if let Some(osc) = self.oscillator_mut(id) {
                    osc.playing = true;
                }
            }
            Command::Stop(id, time) => {
                if let Some(osc) = self.oscillator_mut(id) {
                    osc.stop_at = Some(time);
                }
            }
            Command::Schedule(id, event) => {
                if let Some(gain) = self.gain_mut(id) {
                    gain.timeline.apply(event);
                }
            }
            Command::Cancel(id, time) => {
                if let Some(gain) = self.gain_mut(id) {
                    gain.timeline.cancel_scheduled_values(time);
                }
            }
            Command::Connect { oscillator, gain } => {
                if let Some(osc) = self.oscillator_mut(oscillator) {
                    osc.output = Some(gain);
                }
            }
            Command::ConnectToOutput(id) => {
                if let Some(gain) = self.gain_mut(id) {
                    gain.to_output = true;
                }
            }
        }
    }

    fn oscillator_mut(&mut self, id: NodeId) -> Option<&mut OscillatorVoice> {
        self.oscillators.iter_mut().find(|o| o.id == id)
    }

    fn gain_mut(&mut self, id: NodeId) -> Option<&mut GainStage> {
        self.gains.iter_mut().find(|g| g.id == id)
    }

    /// Hand oscillators past their stop time, and the gains they fed, back
    /// to the control side.
    fn collect_stopped(&mut self, now: f64) {
        let mut index = 0;
        while index < self.oscillators.len() {
            let osc = &self.oscillators[index];
            if osc.stop_at.is_some_and(|stop| stop <= now) {
                let osc = self.oscillators.swap_remove(index);
                let fed = osc.output;
                self.retire(Retired::Oscillator(osc));

                let Some(gain_id) = fed else { continue };
                if self.oscillators.iter().any(|o| o.output == Some(gain_id)) {
                    continue;
                }
                if let Some(pos) = self.gains.iter().position(|g| g.id == gain_id) {
                    let gain = self.gains.swap_remove(pos);
                    self.retire(Retired::Gain(gain));
                }
            } else {
                index += 1;
            }
        }
    }

    fn retire(&mut self, value: Retired) {
        // Sized so this does not fill while the context is collecting. If it
        // ever does, the value is freed here instead.
        let _ = self.retired.push(value);
    }
}
