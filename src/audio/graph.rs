// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Mixing graph.
//!
//! The graph owns everything that sounds: the master gain, one automated
//! gain bus per playing track context (fades are bus automation), and the
//! currently active voices. Rendering advances the audio clock: the
//! graph's notion of "now" is the number of frames rendered so far over
//! the sample rate, which is also the time base every scheduled event is
//! expressed in.

use std::collections::HashMap;

use crate::synth::{Param, Voice, VoiceParams, SILENT_FLOOR};

/// Identifier for a gain bus in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusId(pub(crate) u64);

impl BusId {
    /// The always-present master output bus
    pub const MASTER: BusId = BusId(0);
}

struct ActiveVoice {
    bus: BusId,
    voice: Voice,
}

/// The audio graph: master gain, per-context buses, active voices
pub struct Graph {
    sample_rate: f64,
    frames: u64,
    master_gain: f64,
    buses: HashMap<BusId, Param>,
    next_bus: u64,
    voices: Vec<ActiveVoice>,
}

impl Graph {
    /// Create a graph rendering at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            frames: 0,
            master_gain: 1.0,
            buses: HashMap::new(),
            next_bus: 1,
            voices: Vec::new(),
        }
    }

    /// Current audio-clock time in seconds
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Set the master gain (0.0 - 1.0)
    pub fn set_master_gain(&mut self, gain: f64) {
        self.master_gain = gain.clamp(0.0, 1.0);
    }

    /// Allocate a gain bus for one track context
    pub fn create_bus(&mut self) -> BusId {
        let id = BusId(self.next_bus);
        self.next_bus += 1;
        self.buses.insert(id, Param::new(1.0));
        id
    }

    /// Remove a bus and any voices still routed through it
    pub fn drop_bus(&mut self, bus: BusId) {
        if bus == BusId::MASTER {
            return;
        }
        self.buses.remove(&bus);
        self.voices.retain(|v| v.bus != bus);
    }

    /// Ramp a bus from the silent floor up to unity over `seconds`
    ///
    /// A zero-length fade collapses to an immediate step.
    pub fn fade_in(&mut self, bus: BusId, start: f64, seconds: f64) {
        if let Some(param) = self.buses.get_mut(&bus) {
            if seconds > 0.0 {
                param.set_value_at(start, SILENT_FLOOR);
                param.exponential_ramp_to(start + seconds, 1.0);
            } else {
                param.set_value_at(start, 1.0);
            }
        }
    }

    /// Ramp a bus exponentially down to the silent floor over `seconds`
    pub fn fade_out(&mut self, bus: BusId, start: f64, seconds: f64) {
        if let Some(param) = self.buses.get_mut(&bus) {
            if seconds > 0.0 {
                // Pin the ramp's starting point at the current value
                let current = param.value_at(start).max(SILENT_FLOOR);
                param.set_value_at(start, current);
                param.exponential_ramp_to(start + seconds, SILENT_FLOOR);
            } else {
                param.set_value_at(start, SILENT_FLOOR);
            }
        }
    }

    /// Approach zero with `time_constant` seconds (click-free stop)
    pub fn silence(&mut self, bus: BusId, start: f64, time_constant: f64) {
        if let Some(param) = self.buses.get_mut(&bus) {
            param.set_target_at(start, 0.0, time_constant);
        }
    }

    /// Gain of a bus at clock time `t`; the master bus is always unity
    pub fn bus_gain_at(&self, bus: BusId, t: f64) -> f64 {
        if bus == BusId::MASTER {
            return 1.0;
        }
        self.buses
            .get(&bus)
            .map(|p| p.value_at(t))
            .unwrap_or(0.0)
    }

    /// Schedule one drum hit on a bus
    ///
    /// A start time at or before "now" plays immediately.
    pub fn spawn_drum(&mut self, name: &str, start: f64, volume: f64, bus: BusId) {
        let start = start.max(self.now());
        self.voices.push(ActiveVoice {
            bus,
            voice: Voice::drum(name, start, volume.clamp(0.0, 1.0)),
        });
    }

    /// Schedule one synth note on a bus
    pub fn spawn_synth(&mut self, note: &str, start: f64, params: &VoiceParams, bus: BusId) {
        let start = start.max(self.now());
        self.voices.push(ActiveVoice {
            bus,
            voice: Voice::synth(note, start, params, self.sample_rate),
        });
    }

    /// Number of voices currently held by the graph
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Number of allocated buses (excluding the master)
    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Render interleaved frames into `buffer`, advancing the clock
    ///
    /// Voices past their stop time are reclaimed after the pass; no
    /// explicit cleanup is required beyond this.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let dt = 1.0 / self.sample_rate;

        for frame in buffer.chunks_mut(channels) {
            let t = self.frames as f64 * dt;
            let mut mix = 0.0;

            for active in self.voices.iter_mut() {
                let sample = active.voice.sample(t, dt);
                if sample != 0.0 {
                    let gain = if active.bus == BusId::MASTER {
                        1.0
                    } else {
                        self.buses
                            .get(&active.bus)
                            .map(|p| p.value_at(t))
                            .unwrap_or(0.0)
                    };
                    mix += sample * gain;
                }
            }

            let out = (mix * self.master_gain) as f32;
            for sample in frame.iter_mut() {
                *sample = out;
            }
            self.frames += 1;
        }

        self.voices.retain(|v| !v.voice.is_finished());
    }
}
