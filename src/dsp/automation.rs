use crate::MIN_TIME;

/*
Parameter Automation
====================

A gain (or any other scalar) that changes over time according to a list of
scheduled events, rather than being poked sample by sample.

Vocabulary
----------

  event     A target value plus the time (seconds, on the audio clock) at
            which the value must be reached.

  anchor    The most recent event at or before the query time. Its value is
            where the parameter sits once that event has happened.

  ramp      An event that is approached gradually from the previous anchor
            instead of jumping at its time.


Event Kinds
-----------

  SetValue         jump to `value` at `time`
  LinearRamp       straight line from the previous anchor to (time, value)
  ExponentialRamp  constant-ratio curve from the previous anchor to
                   (time, value)

  value
    1.0 ┤      ╱‾‾‾‾╲__________
    0.7 ┤     ╱                ‾‾‾‾╲
        │    ╱  linear  exp         ╲  exp
    0.0 ┼───┴──────────────────────────╲──→ time
       set(0)                      set(snapshot)


Exponential Ramps
-----------------

    v(t) = v0 · (v1 / v0) ^ ((t - t0) / (t1 - t0))

The curve is only defined when both ends are strictly positive. When the
start value is zero (or the signs differ) the parameter holds v0 until t1 and
then jumps, which is why releases aim at a small floor instead of 0.0.


Cancellation
------------

`cancel_scheduled_values(t)` drops every event at or after `t`. A ramp that
was in flight at `t` disappears with it, so callers snapshot the current value
first and re-anchor with a SetValue at `t`.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { value: f32, time: f64 },
    LinearRamp { value: f32, time: f64 },
    ExponentialRamp { value: f32, time: f64 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutomationTimeline {
    default_value: f32,
    events: Vec<AutomationEvent>, // sorted by time, stable for equal times
}

impl AutomationTimeline {
    pub fn new(default_value: f32) -> Self {
        Self::with_capacity(default_value, 8)
    }

    /// Reserve room for `capacity` events so scheduling never allocates
    /// until that many are pending.
    pub fn with_capacity(default_value: f32, capacity: usize) -> Self {
        Self {
            default_value,
            events: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::SetValue { value, time });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::LinearRamp { value, time });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::ExponentialRamp { value, time });
    }

    /// Drop every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|event| event.time() < time);
    }

    pub fn apply(&mut self, event: AutomationEvent) {
        self.insert(event);
    }

    fn insert(&mut self, event: AutomationEvent) {
        let index = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(index, event);
    }

    /// Parameter value at `time`.
    ///
    /// A ramp with no earlier event starts from the default value at time
    /// zero.
    pub fn value_at(&self, time: f64) -> f32 {
        let next = self.events.partition_point(|e| e.time() <= time);

        let (t0, v0) = match next.checked_sub(1).map(|i| self.events[i]) {
            Some(anchor) => (anchor.time(), anchor.value()),
            None => (0.0, self.default_value),
        };

        match self.events.get(next) {
            Some(&AutomationEvent::LinearRamp { value: v1, time: t1 }) => {
                let progress = ramp_progress(t0, t1, time);
                v0 + (v1 - v0) * progress
            }
            Some(&AutomationEvent::ExponentialRamp { value: v1, time: t1 }) => {
                if v0 <= 0.0 || v1 <= 0.0 {
                    return v0;
                }
                let progress = ramp_progress(t0, t1, time);
                v0 * (v1 / v0).powf(progress)
            }
            _ => v0,
        }
    }

    /// Time of the last scheduled event, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.events.last().map(AutomationEvent::time)
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn ramp_progress(t0: f64, t1: f64, time: f64) -> f32 {
    let span = t1 - t0;
    if span < MIN_TIME {
        return 1.0;
    }
    ((time - t0) / span).clamp(0.0, 1.0) as f32
}
