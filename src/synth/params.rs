// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice parameters, waveforms, and instrument presets.

use serde::{Deserialize, Serialize};

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// All waveforms
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Parse from the wire name (e.g. "sawtooth")
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Waveform::Sine),
            "square" => Some(Waveform::Square),
            "sawtooth" => Some(Waveform::Sawtooth),
            "triangle" => Some(Waveform::Triangle),
            _ => None,
        }
    }

    /// Wire name of this waveform
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

/// Fully resolved synthesis parameters for one voice
///
/// Produced by resolving a track's partial parameter record; exists only
/// for the duration of one synthesized note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Volume in percent (0-100)
    pub volume: f64,
    /// Oscillator waveform
    pub wave: Waveform,
    /// Low-pass filter cutoff in Hz
    pub cutoff_hz: f64,
    /// Envelope attack time in seconds
    pub attack_s: f64,
    /// Envelope release time in seconds
    pub release_s: f64,
    /// Unison detune in cents; 0 means a single oscillator
    pub detune_cents: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            volume: 80.0,
            wave: Waveform::Square,
            cutoff_hz: 2000.0,
            attack_s: 0.02,
            release_s: 0.3,
            detune_cents: 0.0,
        }
    }
}

impl VoiceParams {
    /// Target linear gain of the synth envelope peak
    pub fn peak_gain(&self) -> f64 {
        self.volume / 100.0 * 0.2
    }

    /// Linear gain for drum voices
    pub fn drum_gain(&self) -> f64 {
        self.volume / 100.0
    }
}

/// A named instrument preset from the tracker's preset table
///
/// Presets seed waveform, filter, and envelope values; explicit per-track
/// fields override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentPreset {
    /// Preset name as stored in the song's `inst` field
    pub name: &'static str,
    pub wave: Waveform,
    pub filter_hz: f64,
    pub attack_s: f64,
    pub release_s: f64,
    pub detune_cents: f64,
}

/// The tracker's instrument preset table
pub const INSTRUMENT_PRESETS: [InstrumentPreset; 11] = [
    InstrumentPreset {
        name: "lead_square",
        wave: Waveform::Square,
        filter_hz: 2500.0,
        attack_s: 0.01,
        release_s: 0.25,
        detune_cents: 0.0,
    },
    InstrumentPreset {
        name: "lead_saw",
        wave: Waveform::Sawtooth,
        filter_hz: 3000.0,
        attack_s: 0.01,
        release_s: 0.2,
        detune_cents: 0.0,
    },
    InstrumentPreset {
        name: "supersaw",
        wave: Waveform::Sawtooth,
        filter_hz: 4000.0,
        attack_s: 0.02,
        release_s: 0.35,
        detune_cents: 8.0,
    },
    InstrumentPreset {
        name: "bass_deep",
        wave: Waveform::Sine,
        filter_hz: 400.0,
        attack_s: 0.01,
        release_s: 0.4,
        detune_cents: 0.0,
    },
    InstrumentPreset {
        name: "bass_gritty",
        wave: Waveform::Sawtooth,
        filter_hz: 600.0,
        attack_s: 0.01,
        release_s: 0.35,
        detune_cents: 3.0,
    },
    InstrumentPreset {
        name: "bass_wobble",
        wave: Waveform::Sawtooth,
        filter_hz: 500.0,
        attack_s: 0.05,
        release_s: 0.5,
        detune_cents: 5.0,
    },
    InstrumentPreset {
        name: "pluck",
        wave: Waveform::Square,
        filter_hz: 1200.0,
        attack_s: 0.005,
        release_s: 0.15,
        detune_cents: 0.0,
    },
    InstrumentPreset {
        name: "pad_warm",
        wave: Waveform::Triangle,
        filter_hz: 1800.0,
        attack_s: 0.12,
        release_s: 0.8,
        detune_cents: 6.0,
    },
    InstrumentPreset {
        name: "pad_cold",
        wave: Waveform::Square,
        filter_hz: 1500.0,
        attack_s: 0.15,
        release_s: 1.0,
        detune_cents: 4.0,
    },
    InstrumentPreset {
        name: "arp_bright",
        wave: Waveform::Square,
        filter_hz: 3500.0,
        attack_s: 0.005,
        release_s: 0.1,
        detune_cents: 0.0,
    },
    InstrumentPreset {
        name: "organ",
        wave: Waveform::Sine,
        filter_hz: 5000.0,
        attack_s: 0.03,
        release_s: 0.2,
        detune_cents: 12.0,
    },
];

impl InstrumentPreset {
    /// Look up a preset by name
    pub fn by_name(name: &str) -> Option<&'static InstrumentPreset> {
        INSTRUMENT_PRESETS.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = VoiceParams::default();
        assert_eq!(params.volume, 80.0);
        assert_eq!(params.wave, Waveform::Square);
        assert_eq!(params.cutoff_hz, 2000.0);
        assert_eq!(params.attack_s, 0.02);
        assert_eq!(params.release_s, 0.3);
        assert_eq!(params.detune_cents, 0.0);
    }

    #[test]
    fn test_peak_gain() {
        let params = VoiceParams {
            volume: 100.0,
            ..Default::default()
        };
        assert!((params.peak_gain() - 0.2).abs() < 1e-12);
        assert!((VoiceParams::default().peak_gain() - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_waveform_names_round_trip() {
        for wave in Waveform::ALL {
            assert_eq!(Waveform::from_name(wave.name()), Some(wave));
        }
        assert_eq!(Waveform::from_name("noise"), None);
    }

    #[test]
    fn test_waveform_serde_wire_names() {
        let wave: Waveform = serde_json::from_str("\"sawtooth\"").unwrap();
        assert_eq!(wave, Waveform::Sawtooth);
        assert_eq!(serde_json::to_string(&Waveform::Sine).unwrap(), "\"sine\"");
    }

    #[test]
    fn test_preset_lookup() {
        let preset = InstrumentPreset::by_name("supersaw").unwrap();
        assert_eq!(preset.wave, Waveform::Sawtooth);
        assert_eq!(preset.detune_cents, 8.0);
        assert!(InstrumentPreset::by_name("theremin").is_none());
    }

    #[test]
    fn test_preset_names_unique() {
        for (i, a) in INSTRUMENT_PRESETS.iter().enumerate() {
            for b in &INSTRUMENT_PRESETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
