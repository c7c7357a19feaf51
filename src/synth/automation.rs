// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scheduled parameter automation.
//!
//! A [`Param`] holds a timeline of automation events (value jumps, linear
//! and exponential ramps, exponential approach to a target) and evaluates
//! the parameter's value at any point on the audio clock. Gain envelopes,
//! crossfades, and the kick drum's frequency sweep are all expressed as
//! automation timelines.
//!
//! Exponential ramps interpolate between two strictly positive values and
//! must never target zero; silent endpoints use [`SILENT_FLOOR`].

/// Floor value used in place of zero for exponential ramps
pub const SILENT_FLOOR: f64 = 0.0001;

/// One scheduled event on a parameter timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`
    SetValue { time: f64, value: f64 },
    /// Linear ramp from the previous event, ending at (`time`, `value`)
    LinearRamp { time: f64, value: f64 },
    /// Exponential ramp from the previous event, ending at (`time`, `value`)
    ExponentialRamp { time: f64, value: f64 },
    /// Exponential approach toward `target` starting at `time`
    SetTarget {
        time: f64,
        target: f64,
        time_constant: f64,
    },
}

impl AutomationEvent {
    /// Scheduled time of this event
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. }
            | AutomationEvent::SetTarget { time, .. } => time,
        }
    }
}

/// A parameter value with scheduled automation, evaluated on demand
#[derive(Debug, Clone)]
pub struct Param {
    initial: f64,
    events: Vec<AutomationEvent>,
}

impl Param {
    /// Create a parameter holding `initial` until the first event
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Schedule a value jump
    pub fn set_value_at(&mut self, time: f64, value: f64) {
        self.insert(AutomationEvent::SetValue { time, value });
    }

    /// Schedule a linear ramp ending at (`time`, `value`)
    pub fn linear_ramp_to(&mut self, time: f64, value: f64) {
        self.insert(AutomationEvent::LinearRamp { time, value });
    }

    /// Schedule an exponential ramp ending at (`time`, `value`)
    ///
    /// The end value is floored at [`SILENT_FLOOR`]; exponential ramps are
    /// undefined at zero.
    pub fn exponential_ramp_to(&mut self, time: f64, value: f64) {
        self.insert(AutomationEvent::ExponentialRamp {
            time,
            value: value.max(SILENT_FLOOR),
        });
    }

    /// Schedule an exponential approach toward `target` from `time`
    pub fn set_target_at(&mut self, time: f64, target: f64, time_constant: f64) {
        self.insert(AutomationEvent::SetTarget {
            time,
            target,
            time_constant: time_constant.max(1e-6),
        });
    }

    fn insert(&mut self, event: AutomationEvent) {
        // Keep the timeline sorted; equal times preserve insertion order
        let at = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(at, event);
    }

    /// Number of scheduled events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Evaluate the parameter at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        let mut value = self.initial;
        let mut prev_time = 0.0;

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                AutomationEvent::SetValue { time, value: v } => {
                    if time > t {
                        return value;
                    }
                    value = v;
                    prev_time = time;
                }
                AutomationEvent::LinearRamp { time, value: v } => {
                    if time <= t {
                        value = v;
                        prev_time = time;
                    } else {
                        if time <= prev_time {
                            return v;
                        }
                        let frac = ((t - prev_time) / (time - prev_time)).clamp(0.0, 1.0);
                        return value + (v - value) * frac;
                    }
                }
                AutomationEvent::ExponentialRamp { time, value: v } => {
                    if time <= t {
                        value = v;
                        prev_time = time;
                    } else {
                        // Degenerate spans and non-positive endpoints step
                        if time <= prev_time || value <= 0.0 || v <= 0.0 {
                            return v;
                        }
                        let frac = ((t - prev_time) / (time - prev_time)).clamp(0.0, 1.0);
                        return value * (v / value).powf(frac);
                    }
                }
                AutomationEvent::SetTarget {
                    time,
                    target,
                    time_constant,
                } => {
                    if time > t {
                        return value;
                    }
                    let next_time = self.events.get(i + 1).map(AutomationEvent::time);
                    match next_time {
                        // A later event has taken over; freeze the approach
                        // at the takeover instant and keep walking
                        Some(nt) if nt <= t => {
                            value = target + (value - target) * (-(nt - time) / time_constant).exp();
                            prev_time = nt;
                        }
                        _ => {
                            return target + (value - target) * (-(t - time) / time_constant).exp();
                        }
                    }
                }
            }
            i += 1;
        }

        value
    }
}
