// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Track context: one playing instance of a song.

use crate::audio::BusId;
use crate::song::{Song, StepIndex};

/// One playing instance of a song
///
/// Owns the derived step index, the monotonically advancing next-note
/// time, the wrapping step cursor, and the dedicated gain bus used for
/// this instance's fade envelope. At most one context is "current" at a
/// time and at most one is fading out as "previous".
#[derive(Debug, Clone)]
pub struct TrackContext {
    /// The song being played; immutable for the life of the context
    pub(crate) song: Song,
    /// Derived step → triggers table
    pub(crate) index: StepIndex,
    /// Dedicated gain bus for this instance's fades
    pub(crate) bus: BusId,
    /// Audio-clock time the next step fires at; strictly increasing
    pub(crate) next_note_time: f64,
    /// Step cursor; folded modulo the cycle length when scheduled
    pub(crate) current_step: u64,
    /// Cleared on stop or once a supersession fade completes
    pub(crate) is_playing: bool,
    /// Identity for cooperative cancellation checks
    pub(crate) generation: u64,
    /// Clock time after which a superseded context is retired
    pub(crate) fade_deadline: Option<f64>,
}

impl TrackContext {
    /// Create a context for `song`, scheduling its first step at `start`
    pub(crate) fn new(song: Song, bus: BusId, generation: u64, start: f64) -> Self {
        let index = StepIndex::build(&song);
        Self {
            song,
            index,
            bus,
            next_note_time: start,
            current_step: 0,
            is_playing: true,
            generation,
            fade_deadline: None,
        }
    }

    /// The step currently under the cursor, folded to the cycle
    pub fn step(&self) -> u32 {
        (self.current_step % crate::song::STEPS as u64) as u32
    }
}
