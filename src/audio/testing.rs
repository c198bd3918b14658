//! Recording audio context for unit tests.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Arc,
};

use super::{AudioContext, ContextState, GainNode, OscillatorNode};
use crate::{
    dsp::{AutomationTimeline, PeriodicWave},
    error::{Error, Result},
    harmonics::WaveformDescriptor,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Resume,
    CreateOscillator(u32),
    CreateGain(u32),
    SetWave(u32),
    SetFrequency(u32, f32),
    Start(u32),
    Stop(u32, f64),
    Connect(u32, u32),
    ConnectToOutput(u32),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct MockContext {
    clock: Rc<Cell<f64>>,
    state: ContextState,
    calls: CallLog,
    next_id: u32,
    /// Refuse node creation, as a context with no device would
    pub unavailable: bool,
}

impl MockContext {
    pub fn new() -> Self {
        Self {
            clock: Rc::new(Cell::new(0.0)),
            state: ContextState::Suspended,
            calls: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
            unavailable: false,
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.clock.set(self.clock.get() + seconds);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl AudioContext for MockContext {
    type Oscillator = MockOscillator;
    type Gain = MockGain;

    fn current_time(&self) -> f64 {
        self.clock.get()
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        if self.unavailable {
            return Err(Error::AudioUnavailable("mock device missing"));
        }
        self.log(Call::Resume);
        self.state = ContextState::Running;
        Ok(())
    }

    fn create_oscillator(&mut self) -> Result<MockOscillator> {
        if self.unavailable {
            return Err(Error::AudioUnavailable("mock device missing"));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.log(Call::CreateOscillator(id));
        Ok(MockOscillator {
            id,
            frequency: 0.0,
            calls: Rc::clone(&self.calls),
        })
    }

    fn create_gain(&mut self) -> Result<MockGain> {
        if self.unavailable {
            return Err(Error::AudioUnavailable("mock device missing"));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.log(Call::CreateGain(id));
        Ok(MockGain {
            id,
            timeline: AutomationTimeline::new(1.0),
            clock: Rc::clone(&self.clock),
        })
    }

    fn create_periodic_wave(&mut self, descriptor: &WaveformDescriptor) -> Arc<PeriodicWave> {
        Arc::new(PeriodicWave::from_descriptor(descriptor))
    }

    fn connect(&mut self, oscillator: &MockOscillator, gain: &MockGain) {
        self.log(Call::Connect(oscillator.id, gain.id));
    }

    fn connect_to_output(&mut self, gain: &MockGain) {
        self.log(Call::ConnectToOutput(gain.id));
    }
}

pub struct MockOscillator {
    pub id: u32,
    frequency: f32,
    calls: CallLog,
}

impl OscillatorNode for MockOscillator {
    fn set_periodic_wave(&mut self, _wave: Arc<PeriodicWave>) {
        self.calls.borrow_mut().push(Call::SetWave(self.id));
    }

    fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        self.calls.borrow_mut().push(Call::SetFrequency(self.id, hz));
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn start(&mut self) {
        self.calls.borrow_mut().push(Call::Start(self.id));
    }

    fn stop(&mut self, time: f64) {
        self.calls.borrow_mut().push(Call::Stop(self.id, time));
    }
}

pub struct MockGain {
    pub id: u32,
    pub timeline: AutomationTimeline,
    clock: Rc<Cell<f64>>,
}

impl GainNode for MockGain {
    fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.timeline.set_value_at_time(value, time);
    }

    fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.timeline.linear_ramp_to_value_at_time(value, time);
    }

    fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.timeline.exponential_ramp_to_value_at_time(value, time);
    }

    fn cancel_scheduled_values(&mut self, time: f64) {
        self.timeline.cancel_scheduled_values(time);
    }

    fn value(&self) -> f32 {
        self.timeline.value_at(self.clock.get())
    }
}
