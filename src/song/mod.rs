// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song model for the Zsynth playback engine.
//!
//! A song is a tempo, a sparse set of active note triggers on a fixed
//! 64-step cycle, and per-track synthesis parameters. The string-keyed
//! serialization format lives in [`format`]; the derived per-step lookup
//! table lives in [`step_index`].

pub mod format;
pub mod step_index;

pub use format::{SongDoc, SongFormatError};
pub use step_index::{StepIndex, StepTrigger};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::synth::{InstrumentPreset, VoiceParams, Waveform};

/// Number of steps in one pattern cycle (sixteenth notes, four bars of 4/4)
pub const STEPS: u32 = 64;

/// Track ids starting with this prefix use the synth voice; all others drum
pub const SYNTH_TRACK_PREFIX: &str = "synth";

/// Check whether a track id routes to the synth voice
pub fn is_synth_track(track: &str) -> bool {
    track.starts_with(SYNTH_TRACK_PREFIX)
}

/// One active cell in the note grid: play `note` on `track` at `step`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteTrigger {
    /// Track id (e.g. "kick", "synth1")
    pub track: String,
    /// Note or drum name (e.g. "A3", "KICK")
    pub note: String,
    /// Step number; interpreted modulo [`STEPS`] when scheduled
    pub step: u32,
}

impl NoteTrigger {
    /// Create a new trigger
    pub fn new(track: impl Into<String>, note: impl Into<String>, step: u32) -> Self {
        Self {
            track: track.into(),
            note: note.into(),
            step,
        }
    }
}

/// Partial per-track parameter record as authored in the tracker
///
/// Absent fields fall back to the named instrument preset (if any),
/// then to the fixed defaults in [`VoiceParams::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackParams {
    /// Volume in percent (0-100)
    #[serde(rename = "vol", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Oscillator waveform
    #[serde(rename = "wave", default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<Waveform>,
    /// Low-pass filter cutoff in Hz
    #[serde(rename = "filter", default, skip_serializing_if = "Option::is_none")]
    pub filter_hz: Option<f64>,
    /// Envelope attack time in seconds
    #[serde(rename = "attack", default, skip_serializing_if = "Option::is_none")]
    pub attack_s: Option<f64>,
    /// Envelope release time in seconds
    #[serde(rename = "release", default, skip_serializing_if = "Option::is_none")]
    pub release_s: Option<f64>,
    /// Unison detune in cents (0 = single oscillator)
    #[serde(rename = "detune", default, skip_serializing_if = "Option::is_none")]
    pub detune_cents: Option<f64>,
    /// Instrument preset name (see [`InstrumentPreset`])
    #[serde(rename = "inst", default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
}

impl TrackParams {
    /// Resolve to a fully populated parameter record
    ///
    /// Precedence per field: explicit value, then instrument preset,
    /// then fixed default.
    pub fn resolve(&self) -> VoiceParams {
        let defaults = VoiceParams::default();
        let preset = self
            .instrument
            .as_deref()
            .and_then(InstrumentPreset::by_name);

        VoiceParams {
            volume: self.volume.unwrap_or(defaults.volume).clamp(0.0, 100.0),
            wave: self
                .wave
                .or(preset.map(|p| p.wave))
                .unwrap_or(defaults.wave),
            cutoff_hz: self
                .filter_hz
                .or(preset.map(|p| p.filter_hz))
                .unwrap_or(defaults.cutoff_hz),
            attack_s: self
                .attack_s
                .or(preset.map(|p| p.attack_s))
                .unwrap_or(defaults.attack_s),
            release_s: self
                .release_s
                .or(preset.map(|p| p.release_s))
                .unwrap_or(defaults.release_s),
            detune_cents: self
                .detune_cents
                .or(preset.map(|p| p.detune_cents))
                .unwrap_or(defaults.detune_cents),
        }
    }
}

/// A song: tempo, active note grid, and per-track parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    /// Tempo in beats per minute
    pub tempo: f64,
    /// Active note triggers; membership means "play this note at this step"
    pub triggers: HashSet<NoteTrigger>,
    /// Per-track parameter records, keyed by track id
    pub tracks: HashMap<String, TrackParams>,
}

impl Song {
    /// Create an empty song at the given tempo
    pub fn new(tempo: f64) -> Self {
        Self {
            tempo,
            triggers: HashSet::new(),
            tracks: HashMap::new(),
        }
    }

    /// Duration of one step in seconds (a sixteenth note)
    pub fn step_duration(&self) -> f64 {
        60.0 / self.tempo / 4.0
    }

    /// Toggle a trigger; returns true if the trigger is active afterwards
    ///
    /// Toggling the same trigger twice returns the set to its prior content.
    pub fn toggle(&mut self, trigger: NoteTrigger) -> bool {
        if self.triggers.remove(&trigger) {
            false
        } else {
            self.triggers.insert(trigger);
            true
        }
    }

    /// Check whether a trigger is active
    pub fn is_active(&self, trigger: &NoteTrigger) -> bool {
        self.triggers.contains(trigger)
    }

    /// Resolve effective voice parameters for a track
    ///
    /// Tracks with no parameter record resolve to the fixed defaults.
    pub fn voice_params(&self, track: &str) -> VoiceParams {
        self.tracks
            .get(track)
            .map(TrackParams::resolve)
            .unwrap_or_default()
    }
}
