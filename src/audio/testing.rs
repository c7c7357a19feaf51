// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Test support: a fake audio backend.
//!
//! [`MockBackend`] pairs a manually advanced clock with a recording
//! voice sink, so scheduler tests can assert exact trigger timing
//! without audio hardware.

use std::sync::Mutex;

use super::{AudioBackend, BusId};
use crate::synth::VoiceParams;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Drum {
        name: String,
        start: f64,
        volume: f64,
        bus: BusId,
    },
    Synth {
        note: String,
        start: f64,
        params: VoiceParams,
        bus: BusId,
    },
    FadeIn {
        bus: BusId,
        start: f64,
        seconds: f64,
    },
    FadeOut {
        bus: BusId,
        start: f64,
        seconds: f64,
    },
    Silence {
        bus: BusId,
        start: f64,
        time_constant: f64,
    },
    DropBus {
        bus: BusId,
    },
}

/// Fake backend: manual clock plus a recording voice sink
#[derive(Debug)]
pub struct MockBackend {
    now: Mutex<f64>,
    next_bus: Mutex<u64>,
    events: Mutex<Vec<MockEvent>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a backend with the clock at zero
    pub fn new() -> Self {
        Self {
            now: Mutex::new(0.0),
            next_bus: Mutex::new(1),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Advance the clock by `seconds`
    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap() += seconds;
    }

    /// Set the clock to an absolute time
    pub fn set_now(&self, seconds: f64) {
        *self.now.lock().unwrap() = seconds;
    }

    /// All recorded calls, in order
    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Recorded calls, clearing the log
    pub fn take_events(&self) -> Vec<MockEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Recorded drum triggers as (name, start) pairs
    pub fn drum_triggers(&self) -> Vec<(String, f64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Drum { name, start, .. } => Some((name, start)),
                _ => None,
            })
            .collect()
    }

    /// Recorded synth triggers as (note, start) pairs
    pub fn synth_triggers(&self) -> Vec<(String, f64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Synth { note, start, .. } => Some((note, start)),
                _ => None,
            })
            .collect()
    }

    /// Count of voice triggers (drum and synth) in the log
    pub fn trigger_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, MockEvent::Drum { .. } | MockEvent::Synth { .. }))
            .count()
    }

    fn record(&self, event: MockEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AudioBackend for MockBackend {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }

    fn create_bus(&self) -> BusId {
        let mut next = self.next_bus.lock().unwrap();
        let id = BusId(*next);
        *next += 1;
        id
    }

    fn fade_in(&self, bus: BusId, start: f64, seconds: f64) {
        self.record(MockEvent::FadeIn {
            bus,
            start,
            seconds,
        });
    }

    fn fade_out(&self, bus: BusId, start: f64, seconds: f64) {
        self.record(MockEvent::FadeOut {
            bus,
            start,
            seconds,
        });
    }

    fn silence(&self, bus: BusId, start: f64, time_constant: f64) {
        self.record(MockEvent::Silence {
            bus,
            start,
            time_constant,
        });
    }

    fn drop_bus(&self, bus: BusId) {
        self.record(MockEvent::DropBus { bus });
    }

    fn play_drum(&self, name: &str, start: f64, volume: f64, bus: BusId) {
        self.record(MockEvent::Drum {
            name: name.to_string(),
            start,
            volume,
            bus,
        });
    }

    fn play_synth(&self, note: &str, start: f64, params: &VoiceParams, bus: BusId) {
        self.record(MockEvent::Synth {
            note: note.to_string(),
            start,
            params: *params,
            bus,
        });
    }
}
