// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step-indexed trigger table.
//!
//! Built once per playing track context from the song's sparse trigger
//! set, so the scheduler looks up a step's triggers in O(1) instead of
//! scanning the whole set on every tick.

use super::{NoteTrigger, Song, STEPS};

/// One trigger derived for a step: which track plays which note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTrigger {
    /// Track id
    pub track: String,
    /// Note or drum name
    pub note: String,
}

impl From<&NoteTrigger> for StepTrigger {
    fn from(trigger: &NoteTrigger) -> Self {
        Self {
            track: trigger.track.clone(),
            note: trigger.note.clone(),
        }
    }
}

/// Lookup table mapping each of the 64 steps to its triggers
///
/// Steps with no triggers hold an empty (not missing) bucket. The table
/// is never mutated after construction; the authored song stays immutable
/// for the life of the playing context.
#[derive(Debug, Clone)]
pub struct StepIndex {
    buckets: Vec<Vec<StepTrigger>>,
}

impl StepIndex {
    /// Build the index from a song's trigger set
    ///
    /// Stored step numbers are folded modulo [`STEPS`], so a trigger at
    /// step 64 schedules identically to one at step 0.
    pub fn build(song: &Song) -> Self {
        let mut buckets = vec![Vec::new(); STEPS as usize];
        for trigger in &song.triggers {
            buckets[(trigger.step % STEPS) as usize].push(StepTrigger::from(trigger));
        }
        Self { buckets }
    }

    /// Create an index with no triggers at all
    pub fn empty() -> Self {
        Self {
            buckets: vec![Vec::new(); STEPS as usize],
        }
    }

    /// Triggers for a step; the cursor value is folded modulo [`STEPS`]
    pub fn triggers_at(&self, step: u64) -> &[StepTrigger] {
        &self.buckets[(step % STEPS as u64) as usize]
    }

    /// Total number of triggers across all steps
    pub fn total_triggers(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// True if no step has any trigger
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

impl Default for StepIndex {
    fn default() -> Self {
        Self::empty()
    }
}
