// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice synthesis.
//!
//! A voice is one independently synthesized sound instance: one drum hit
//! or one note, with its own transient oscillator/filter/envelope chain.
//! Voices are fire-and-forget; once spawned they render until their stop
//! time passes and are then reclaimed by the graph.
//!
//! Two models:
//! - Drum voices: a kick (exponential 150 Hz pitch sweep) or a generic
//!   percussion hit (triangle at 120 Hz), both with short exponential
//!   gain decays.
//! - Synth voices: a pitched oscillator (optionally a detuned unison
//!   pair) through a low-pass filter and an attack/release envelope.

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

use super::automation::{Param, SILENT_FLOOR};
use super::note::note_freq;
use super::params::{VoiceParams, Waveform};

/// Drum voice flavor, selected by drum name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumKind {
    /// Pitch-swept kick drum
    Kick,
    /// Any other percussion hit (snare, hat, ...)
    Perc,
}

impl DrumKind {
    /// Classify a drum name; only "KICK" gets the pitch sweep
    pub fn from_name(name: &str) -> Self {
        if name == "KICK" {
            DrumKind::Kick
        } else {
            DrumKind::Perc
        }
    }
}

/// RBJ low-pass biquad with Butterworth response
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Build a low-pass section at `cutoff_hz`
    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.45);
        let w0 = TAU * cutoff / sample_rate;
        let alpha = w0.sin() / (2.0 * FRAC_1_SQRT_2);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;

        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Process one sample
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Evaluate a naive waveform at a phase in [0, TAU)
fn oscillate(wave: Waveform, phase: f64) -> f64 {
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase < PI {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * (phase / TAU) - 1.0,
        Waveform::Triangle => {
            let p = phase / TAU;
            if p < 0.25 {
                4.0 * p
            } else if p < 0.75 {
                2.0 - 4.0 * p
            } else {
                4.0 * p - 4.0
            }
        }
    }
}

/// One scheduled, independently rendered sound instance
#[derive(Debug, Clone)]
pub struct Voice {
    start: f64,
    stop: f64,
    wave: Waveform,
    gain: Param,
    freq: Param,
    detune_freq: Option<f64>,
    filter: Option<Biquad>,
    phase: f64,
    detune_phase: f64,
    finished: bool,
}

impl Voice {
    /// Kick drum: frequency sweeps exponentially from 150 Hz toward
    /// near-zero over 0.2 s while the gain decays over the same window
    pub fn kick(start: f64, volume: f64) -> Self {
        let mut gain = Param::new(0.0);
        gain.set_value_at(start, volume * 0.5);
        gain.exponential_ramp_to(start + 0.2, 0.01);

        let mut freq = Param::new(150.0);
        freq.set_value_at(start, 150.0);
        freq.exponential_ramp_to(start + 0.2, 0.01);

        Self {
            start,
            stop: start + 0.2,
            wave: Waveform::Sine,
            gain,
            freq,
            detune_freq: None,
            filter: None,
            phase: 0.0,
            detune_phase: 0.0,
            finished: false,
        }
    }

    /// Generic percussion hit: triangle wave held at 120 Hz, gain
    /// decaying exponentially over 0.1 s
    pub fn perc(start: f64, volume: f64) -> Self {
        let mut gain = Param::new(0.0);
        gain.set_value_at(start, volume * 0.5);
        gain.exponential_ramp_to(start + 0.1, 0.01);

        Self {
            start,
            stop: start + 0.2,
            wave: Waveform::Triangle,
            gain,
            freq: Param::new(120.0),
            detune_freq: None,
            filter: None,
            phase: 0.0,
            detune_phase: 0.0,
            finished: false,
        }
    }

    /// Drum voice dispatched by name
    pub fn drum(name: &str, start: f64, volume: f64) -> Self {
        match DrumKind::from_name(name) {
            DrumKind::Kick => Self::kick(start, volume),
            DrumKind::Perc => Self::perc(start, volume),
        }
    }

    /// Pitched synth voice
    ///
    /// Unknown note names fall back to a fixed default frequency rather
    /// than failing; a nonzero detune adds exactly one unison partner.
    pub fn synth(note: &str, start: f64, params: &VoiceParams, sample_rate: f64) -> Self {
        let freq_hz = note_freq(note);
        let peak = params.peak_gain();

        let mut gain = Param::new(0.0);
        gain.set_value_at(start, SILENT_FLOOR);
        gain.linear_ramp_to(start + params.attack_s, peak);
        gain.exponential_ramp_to(start + params.attack_s + params.release_s, SILENT_FLOOR);

        let detune_freq = if params.detune_cents != 0.0 {
            Some(freq_hz * 2f64.powf(params.detune_cents / 1200.0))
        } else {
            None
        };

        Self {
            start,
            stop: start + params.attack_s + params.release_s + 0.05,
            wave: params.wave,
            gain,
            freq: Param::new(freq_hz),
            detune_freq,
            filter: Some(Biquad::lowpass(params.cutoff_hz, sample_rate)),
            phase: 0.0,
            detune_phase: 0.0,
            finished: false,
        }
    }

    /// Scheduled start time
    pub fn start_time(&self) -> f64 {
        self.start
    }

    /// Scheduled stop time; the voice is reclaimable after this passes
    pub fn stop_time(&self) -> f64 {
        self.stop
    }

    /// True once the voice has rendered past its stop time
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Render one mono sample at clock time `t`, advancing phase state
    ///
    /// `dt` is the sample period. Must be called with monotonically
    /// increasing `t`; the filter carries state between calls.
    pub fn sample(&mut self, t: f64, dt: f64) -> f64 {
        if t < self.start {
            return 0.0;
        }
        if t >= self.stop {
            self.finished = true;
            return 0.0;
        }

        let f = self.freq.value_at(t);
        self.phase = (self.phase + TAU * f * dt) % TAU;
        let mut x = oscillate(self.wave, self.phase);

        if let Some(f2) = self.detune_freq {
            self.detune_phase = (self.detune_phase + TAU * f2 * dt) % TAU;
            x += oscillate(self.wave, self.detune_phase);
        }

        if let Some(filter) = self.filter.as_mut() {
            x = filter.process(x);
        }

        x * self.gain.value_at(t)
    }
}
