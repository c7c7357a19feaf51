// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note-name to frequency lookup.
//!
//! Covers the chromatic range the tracker exposes (B4 down to A1).
//! Unknown names fall back to a fixed default so playback never stops
//! over a misspelled note.

/// Fallback frequency in Hz for unrecognized note names
pub const DEFAULT_FREQ: f64 = 220.0;

/// Chromatic note-name to frequency table, B4 down to A1
pub const NOTE_FREQS: [(&str, f64); 39] = [
    ("B4", 493.88),
    ("Bb4", 466.16),
    ("A4", 440.0),
    ("Ab4", 415.3),
    ("G4", 392.0),
    ("Gb4", 369.99),
    ("F4", 349.23),
    ("E4", 329.63),
    ("Eb4", 311.13),
    ("D4", 293.66),
    ("Db4", 277.18),
    ("C4", 261.63),
    ("B3", 246.94),
    ("Bb3", 233.08),
    ("A3", 220.0),
    ("Ab3", 207.65),
    ("G3", 196.0),
    ("Gb3", 185.0),
    ("F3", 174.61),
    ("E3", 164.81),
    ("Eb3", 155.56),
    ("D3", 146.83),
    ("Db3", 138.59),
    ("C3", 130.81),
    ("B2", 123.47),
    ("Bb2", 116.54),
    ("A2", 110.0),
    ("Ab2", 103.83),
    ("G2", 98.0),
    ("Gb2", 92.5),
    ("F2", 87.31),
    ("E2", 82.41),
    ("Eb2", 77.78),
    ("D2", 73.42),
    ("Db2", 69.3),
    ("C2", 65.41),
    ("B1", 61.74),
    ("Bb1", 58.27),
    ("A1", 55.0),
];

/// Resolve a note name to its frequency in Hz
///
/// Unknown names resolve to [`DEFAULT_FREQ`] rather than failing.
pub fn note_freq(name: &str) -> f64 {
    NOTE_FREQS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| *f)
        .unwrap_or(DEFAULT_FREQ)
}
