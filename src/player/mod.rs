// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Player: track lifecycle, crossfades, and the scheduling loop.
//!
//! This module provides:
//! - [`Player`], an explicit player instance (construct as many as you
//!   need; audition paths and tests get their own)
//! - Crossfaded transitions between at most one current and one fading
//!   previous track context
//! - Stop, mute/unmute, the per-step observer hook, and one-shot
//!   audition access to the voice primitives

pub mod context;
pub mod scheduler;

pub use context::TrackContext;
pub use scheduler::{LOOKAHEAD, SCHEDULE_LEAD, STOP_RAMP, TICK_INTERVAL};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::audio::{AudioBackend, BusId};
use crate::song::Song;
use crate::synth::VoiceParams;

/// Crossfade length used when no explicit value is given
pub const DEFAULT_CROSSFADE: f64 = 0.5;

/// Mutable player state; touched only under the player's lock
pub(crate) struct PlayerState {
    /// Song catalog, keyed by song name
    pub(crate) songs: HashMap<String, Song>,
    /// The registered current context, if any
    pub(crate) current: Option<TrackContext>,
    /// A superseded context still fading out, if any
    pub(crate) previous: Option<TrackContext>,
    /// Identity of the registered current context
    pub(crate) current_generation: u64,
    /// While muted, play requests record the key without starting
    pub(crate) muted: bool,
    /// Most recently requested song key (for unmute)
    pub(crate) last_key: Option<String>,
    /// Observer invoked with the step number on every scheduled step
    pub(crate) on_step: Option<Box<dyn FnMut(u32) + Send>>,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            songs: HashMap::new(),
            current: None,
            previous: None,
            current_generation: 0,
            muted: false,
            last_key: None,
            on_step: None,
        }
    }

    fn has_work(&self) -> bool {
        self.previous.is_some() || self.current.as_ref().map_or(false, |c| c.is_playing)
    }
}

/// The Zsynth player
///
/// Owns a song catalog and at most two track contexts (one current, one
/// fading out). Scheduling runs either on the dedicated thread spawned
/// by [`Player::start`] or through explicit [`Player::pump`] calls from
/// a host-driven loop.
pub struct Player {
    backend: Arc<dyn AudioBackend>,
    state: Arc<Mutex<PlayerState>>,
    wake: Arc<Condvar>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Player {
    /// Create a player over an audio backend
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(PlayerState::new())),
            wake: Arc::new(Condvar::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Replace the song catalog
    pub fn init(&self, catalog: HashMap<String, Song>) {
        let mut state = self.lock();
        state.songs = catalog;
    }

    /// Add or replace one catalog entry
    pub fn add_song(&self, key: impl Into<String>, song: Song) {
        let mut state = self.lock();
        state.songs.insert(key.into(), song);
    }

    /// Spawn the scheduling thread
    ///
    /// The thread parks while nothing is playing and is re-armed by
    /// `play`. Hosts driving their own loop can skip this and call
    /// [`Player::pump`] instead.
    pub fn start(&mut self) {
        if self.thread.is_some() {
            return;
        }

        let state = Arc::clone(&self.state);
        let backend = Arc::clone(&self.backend);
        let wake = Arc::clone(&self.wake);
        let shutdown = Arc::clone(&self.shutdown);

        self.thread = Some(thread::spawn(move || {
            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
            loop {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                if !guard.has_work() {
                    guard = wake.wait(guard).unwrap_or_else(|e| e.into_inner());
                    continue;
                }

                scheduler::tick(&mut guard, backend.as_ref());

                drop(guard);
                thread::sleep(TICK_INTERVAL);
                guard = state.lock().unwrap_or_else(|e| e.into_inner());
            }
        }));
    }

    /// Run one scheduler pass immediately
    pub fn pump(&self) {
        let mut state = self.lock();
        scheduler::tick(&mut state, self.backend.as_ref());
    }

    /// Play a song from the catalog, crossfading over `crossfade` seconds
    ///
    /// Unknown keys are ignored: the currently playing track, if any,
    /// keeps going. A crossfade of zero is an immediate cut. While muted
    /// the key is recorded but playback does not start.
    pub fn play(&self, key: &str, crossfade: f64) {
        let mut state = self.lock();
        state.last_key = Some(key.to_string());
        if state.muted {
            return;
        }

        let Some(song) = state.songs.get(key).cloned() else {
            debug!("unknown song key {:?}, ignoring play request", key);
            return;
        };

        let now = self.backend.now();
        let crossfade = crossfade.max(0.0);

        // A third transition first evicts the oldest fading context
        if let Some(oldest) = state.previous.take() {
            self.backend.drop_bus(oldest.bus);
        }

        // Demote the current context and start its fade-out; teardown is
        // lazy, on the tick after the deadline passes
        if let Some(mut outgoing) = state.current.take() {
            if outgoing.is_playing {
                self.backend.fade_out(outgoing.bus, now, crossfade);
                outgoing.fade_deadline = Some(now + crossfade);
                state.previous = Some(outgoing);
            } else {
                self.backend.drop_bus(outgoing.bus);
            }
        }

        let bus = self.backend.create_bus();
        self.backend.fade_in(bus, now, crossfade);

        state.current_generation += 1;
        let generation = state.current_generation;
        state.current = Some(TrackContext::new(song, bus, generation, now + SCHEDULE_LEAD));

        drop(state);
        self.wake.notify_all();
    }

    /// Stop the current track with a short click-free ramp
    ///
    /// Already-scheduled voices play out their natural envelope; the bus
    /// ramp silences their audible tail.
    pub fn stop(&self) {
        let mut state = self.lock();
        self.stop_locked(&mut state);
    }

    fn stop_locked(&self, state: &mut PlayerState) {
        if let Some(current) = state.current.as_mut() {
            if current.is_playing {
                current.is_playing = false;
                self.backend
                    .silence(current.bus, self.backend.now(), STOP_RAMP);
            }
        }
    }

    /// Mute: stop output, remembering the last requested song
    pub fn mute(&self) {
        let mut state = self.lock();
        state.muted = true;
        self.stop_locked(&mut state);
    }

    /// Unmute: restart the last requested song from step 0
    pub fn unmute(&self) {
        let key = {
            let mut state = self.lock();
            state.muted = false;
            state.last_key.clone()
        };
        if let Some(key) = key {
            self.play(&key, DEFAULT_CROSSFADE);
        }
    }

    /// Whether the player is muted
    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    /// Whether a current context is playing
    pub fn is_playing(&self) -> bool {
        self.lock()
            .current
            .as_ref()
            .map_or(false, |c| c.is_playing)
    }

    /// Step currently under the cursor of the current context
    pub fn current_step(&self) -> Option<u32> {
        self.lock().current.as_ref().map(TrackContext::step)
    }

    /// Register the per-step observer
    ///
    /// Invoked with the step number for every scheduled step; drives any
    /// visual step indicator. The callback runs on the scheduling thread
    /// and must not call back into the player.
    pub fn set_on_step(&self, callback: impl FnMut(u32) + Send + 'static) {
        self.lock().on_step = Some(Box::new(callback));
    }

    /// Remove the per-step observer
    pub fn clear_on_step(&self) {
        self.lock().on_step = None;
    }

    /// Audition a single drum hit outside of song playback
    ///
    /// `volume` is in percent (0-100), as the tracker's knobs express it.
    pub fn audition_drum(&self, name: &str, volume: f64) {
        self.backend
            .play_drum(name, 0.0, (volume / 100.0).clamp(0.0, 1.0), BusId::MASTER);
    }

    /// Audition a single synth note outside of song playback
    pub fn audition_synth(&self, note: &str, params: &VoiceParams) {
        self.backend.play_synth(note, 0.0, params, BusId::MASTER);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.wake.notify_all();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
