// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Serialized song format.
//!
//! Songs travel as JSON documents produced by the tracker editor:
//! a string-encoded bpm, an `activeData` map whose keys encode
//! `<track>-<note>-<step>`, and a per-track `config` map. The composite
//! key splits on `-`: the last segment is the step, the first is the
//! track id, and all middle segments joined by `-` form the note name.
//!
//! String keys exist only at this boundary; the engine works on the
//! structured [`Song`] model.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{NoteTrigger, Song, TrackParams};

/// Errors produced while decoding a song document
#[derive(Debug, Error)]
pub enum SongFormatError {
    /// The document is not valid JSON for the expected shape
    #[error("invalid song document: {0}")]
    Json(#[from] serde_json::Error),
    /// The bpm field does not parse to a positive number
    #[error("invalid bpm value: {0:?}")]
    InvalidBpm(String),
    /// An activeData key does not encode `<track>-<note>-<step>`
    #[error("malformed note key: {0:?}")]
    MalformedKey(String),
}

/// Song document as produced by the tracker editor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SongDoc {
    /// Tempo in beats per minute, string-encoded
    pub bpm: String,
    /// Active grid cells: `"<track>-<note>-<step>" -> true`
    #[serde(rename = "activeData", default)]
    pub active_data: HashMap<String, bool>,
    /// Per-track parameter records
    #[serde(default)]
    pub config: HashMap<String, TrackParams>,
}

impl SongDoc {
    /// Parse a song document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SongFormatError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, SongFormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode into the structured song model
    ///
    /// Malformed documents are errors; the engine never attempts partial
    /// recovery of corrupt song data.
    pub fn decode(&self) -> Result<Song, SongFormatError> {
        let tempo: f64 = self
            .bpm
            .trim()
            .parse()
            .map_err(|_| SongFormatError::InvalidBpm(self.bpm.clone()))?;
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(SongFormatError::InvalidBpm(self.bpm.clone()));
        }

        let mut song = Song::new(tempo);
        for (key, active) in &self.active_data {
            if !active {
                continue;
            }
            song.triggers.insert(decode_key(key)?);
        }
        song.tracks = self.config.clone();
        Ok(song)
    }

    /// Encode a structured song back into the editor's document shape
    pub fn encode(song: &Song) -> Self {
        let mut active_data = HashMap::new();
        for trigger in &song.triggers {
            active_data.insert(encode_key(trigger), true);
        }
        Self {
            bpm: song.tempo.to_string(),
            active_data,
            config: song.tracks.clone(),
        }
    }
}

/// Decode a composite `<track>-<note>-<step>` key
pub fn decode_key(key: &str) -> Result<NoteTrigger, SongFormatError> {
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() < 3 {
        return Err(SongFormatError::MalformedKey(key.to_string()));
    }

    let step: u32 = parts[parts.len() - 1]
        .parse()
        .map_err(|_| SongFormatError::MalformedKey(key.to_string()))?;
    let track = parts[0];
    if track.is_empty() {
        return Err(SongFormatError::MalformedKey(key.to_string()));
    }
    // Note names may contain embedded separators; rejoin the middle
    let note = parts[1..parts.len() - 1].join("-");
    if note.is_empty() {
        return Err(SongFormatError::MalformedKey(key.to_string()));
    }

    Ok(NoteTrigger::new(track, note, step))
}

/// Encode a trigger as a composite key
pub fn encode_key(trigger: &NoteTrigger) -> String {
    format!("{}-{}-{}", trigger.track, trigger.note, trigger.step)
}

/// Load a single song from a JSON file
pub fn load_song<P: AsRef<Path>>(path: P) -> Result<Song> {
    let contents = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read song file: {:?}", path.as_ref()))?;
    let doc = SongDoc::from_json(&contents)
        .with_context(|| format!("Failed to parse song file: {:?}", path.as_ref()))?;
    doc.decode()
        .with_context(|| format!("Failed to decode song file: {:?}", path.as_ref()))
}

/// Load a catalog of songs from a directory of `.json` files
///
/// Each file becomes one catalog entry keyed by its file stem.
pub fn load_catalog<P: AsRef<Path>>(dir: P) -> Result<HashMap<String, Song>> {
    let mut catalog = HashMap::new();
    let entries = fs::read_dir(dir.as_ref())
        .with_context(|| format!("Failed to read song directory: {:?}", dir.as_ref()))?;

    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        catalog.insert(key.to_string(), load_song(&path)?);
    }

    Ok(catalog)
}
