// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Zsynth - step-sequenced music playback engine.
//!
//! Zsynth turns a sparse, human-edited 64-step note grid into precisely
//! timed synthesized sound. It backs the rescue-mission game's music as
//! well as the tracker editor's live preview.
//!
//! The engine is built from:
//! - A song model (tempo, active note triples, per-track parameters)
//!   with a JSON wire format shared with the tracker editor
//! - Two voice models: percussive drum voices and parametric synth
//!   voices with optional unison detune
//! - A lookahead step scheduler that schedules voices against the audio
//!   clock, so timing never depends on tick precision
//! - A track lifecycle manager crossfading between at most one current
//!   and one fading previous track
//!
//! Players are explicit instances over an [`audio::AudioBackend`]; the
//! real backend renders through cpal, and tests inject a fake clock and
//! voice sink.
//!
//! ```no_run
//! use std::sync::Arc;
//! use zsynth::audio::Engine;
//! use zsynth::player::Player;
//! use zsynth::song::{NoteTrigger, Song};
//!
//! let engine = Engine::new();
//! let _output = engine.start().expect("audio output");
//!
//! let mut song = Song::new(120.0);
//! song.toggle(NoteTrigger::new("kick", "KICK", 0));
//!
//! let mut player = Player::new(Arc::new(engine));
//! player.add_song("title", song);
//! player.start();
//! player.play("title", 0.5);
//! ```

pub mod audio;
pub mod player;
pub mod song;
pub mod synth;

pub use audio::{AudioBackend, AudioError, BusId, Engine};
pub use player::{Player, DEFAULT_CROSSFADE};
pub use song::{NoteTrigger, Song, SongDoc, StepIndex, TrackParams, STEPS};
pub use synth::{note_freq, VoiceParams, Waveform};
