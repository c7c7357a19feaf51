// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for the Zsynth player.
//!
//! This module provides:
//! - The mixing graph (buses, voices, scheduled automation)
//! - Audio output via cpal
//! - The [`AudioBackend`] seam the player schedules against
//!
//! The player never touches samples; it talks to an `AudioBackend`,
//! which the [`Engine`] implements over the real graph and which tests
//! implement with a fake clock and a recording voice sink.

pub mod graph;
pub mod output;
pub mod testing;

pub use graph::{BusId, Graph};
pub use output::{default_device_name, list_devices, AudioConfig, AudioOutput};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

use crate::synth::VoiceParams;

/// Audio error types
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// No audio output device available
    #[error("no audio output device available")]
    NoDevice,
    /// Failed to build or start the audio stream
    #[error("audio stream failed: {0}")]
    StreamFailed(String),
}

/// The audio subsystem as the player sees it
///
/// One implementation renders for real ([`Engine`]); tests supply a
/// manual clock and a recording sink to assert exact trigger timing
/// without audio hardware.
pub trait AudioBackend: Send + Sync {
    /// Current audio-clock time in seconds
    fn now(&self) -> f64;

    /// Allocate a gain bus for one track context
    fn create_bus(&self) -> BusId;

    /// Ramp a bus from the silent floor up to unity over `seconds`
    fn fade_in(&self, bus: BusId, start: f64, seconds: f64);

    /// Ramp a bus exponentially down to the silent floor over `seconds`
    fn fade_out(&self, bus: BusId, start: f64, seconds: f64);

    /// Approach zero with `time_constant` seconds (click-free stop)
    fn silence(&self, bus: BusId, start: f64, time_constant: f64);

    /// Release a bus and any voices still routed through it
    fn drop_bus(&self, bus: BusId);

    /// Schedule one drum hit; `volume` is linear gain (0-1)
    fn play_drum(&self, name: &str, start: f64, volume: f64, bus: BusId);

    /// Schedule one synth note
    fn play_synth(&self, note: &str, start: f64, params: &VoiceParams, bus: BusId);
}

/// Audio engine: the graph behind a mutex, rendered by the cpal stream
///
/// The engine itself is freely shareable across threads; the cpal stream
/// is not, so [`Engine::start`] hands the stream back to the caller, who
/// keeps it alive for as long as sound should come out.
pub struct Engine {
    graph: Arc<Mutex<Graph>>,
    running: AtomicBool,
    config: AudioConfig,
}

impl Engine {
    /// Create an engine with the default output configuration
    pub fn new() -> Self {
        Self::with_config(AudioConfig::default())
    }

    /// Create an engine with a custom output configuration
    pub fn with_config(config: AudioConfig) -> Self {
        Self {
            graph: Arc::new(Mutex::new(Graph::new(config.sample_rate))),
            running: AtomicBool::new(false),
            config,
        }
    }

    /// Start audio output
    ///
    /// Returns the output stream; drop it to stop rendering (after
    /// calling [`Engine::stop`] so voice dispatch goes quiet again).
    pub fn start(&self) -> Result<AudioOutput, AudioError> {
        let graph = Arc::clone(&self.graph);
        let output = AudioOutput::new(self.config.clone(), move |buffer, channels| {
            if let Ok(mut graph) = graph.lock() {
                graph.render(buffer, channels);
            }
        })?;

        self.running.store(true, Ordering::Relaxed);
        Ok(output)
    }

    /// Mark the engine stopped; subsequent voice dispatch is dropped
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Check whether the engine has been started
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Set the master volume (0.0 - 1.0)
    pub fn set_volume(&self, volume: f64) {
        if let Ok(mut graph) = self.graph.lock() {
            graph.set_master_gain(volume);
        }
    }

    /// Shared handle to the graph (render path and tests)
    pub fn graph(&self) -> Arc<Mutex<Graph>> {
        Arc::clone(&self.graph)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for Engine {
    fn now(&self) -> f64 {
        self.graph.lock().map(|g| g.now()).unwrap_or(0.0)
    }

    fn create_bus(&self) -> BusId {
        match self.graph.lock() {
            Ok(mut graph) => graph.create_bus(),
            Err(_) => BusId::MASTER,
        }
    }

    fn fade_in(&self, bus: BusId, start: f64, seconds: f64) {
        if let Ok(mut graph) = self.graph.lock() {
            graph.fade_in(bus, start, seconds);
        }
    }

    fn fade_out(&self, bus: BusId, start: f64, seconds: f64) {
        if let Ok(mut graph) = self.graph.lock() {
            graph.fade_out(bus, start, seconds);
        }
    }

    fn silence(&self, bus: BusId, start: f64, time_constant: f64) {
        if let Ok(mut graph) = self.graph.lock() {
            graph.silence(bus, start, time_constant);
        }
    }

    fn drop_bus(&self, bus: BusId) {
        if let Ok(mut graph) = self.graph.lock() {
            graph.drop_bus(bus);
        }
    }

    fn play_drum(&self, name: &str, start: f64, volume: f64, bus: BusId) {
        if !self.is_running() {
            warn!("audio engine not started; dropping drum voice {:?}", name);
            return;
        }
        if let Ok(mut graph) = self.graph.lock() {
            graph.spawn_drum(name, start, volume, bus);
        }
    }

    fn play_synth(&self, note: &str, start: f64, params: &VoiceParams, bus: BusId) {
        if !self.is_running() {
            warn!("audio engine not started; dropping synth voice {:?}", note);
            return;
        }
        if let Ok(mut graph) = self.graph.lock() {
            graph.spawn_synth(note, start, params, bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = Engine::new();
        assert!(!engine.is_running());
        assert_eq!(engine.sample_rate(), 44100);
    }

    #[test]
    fn test_dispatch_before_start_is_a_noop() {
        let engine = Engine::new();
        engine.play_drum("KICK", 0.0, 0.8, BusId::MASTER);
        engine.play_synth("A3", 0.0, &VoiceParams::default(), BusId::MASTER);

        let graph = engine.graph();
        assert_eq!(graph.lock().unwrap().voice_count(), 0);
    }

    #[test]
    fn test_bus_control_works_without_stream() {
        let engine = Engine::new();
        let bus = engine.create_bus();
        engine.fade_in(bus, 0.0, 0.5);
        engine.fade_out(bus, 1.0, 0.5);
        engine.drop_bus(bus);

        let graph = engine.graph();
        assert_eq!(graph.lock().unwrap().bus_count(), 0);
    }

    #[test]
    fn test_engine_is_shareable() {
        // The player hands the engine to its scheduling thread
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
