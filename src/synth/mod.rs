// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice synthesis for the Zsynth engine.
//!
//! This module provides:
//! - Note-name to frequency lookup
//! - Resolved voice parameters, waveforms, and instrument presets
//! - Scheduled parameter automation (ramps, targets)
//! - The drum and synth voice DSP

pub mod automation;
pub mod note;
pub mod params;
pub mod voice;

pub use automation::{AutomationEvent, Param, SILENT_FLOOR};
pub use note::{note_freq, DEFAULT_FREQ, NOTE_FREQS};
pub use params::{InstrumentPreset, VoiceParams, Waveform, INSTRUMENT_PRESETS};
pub use voice::{Biquad, DrumKind, Voice};
