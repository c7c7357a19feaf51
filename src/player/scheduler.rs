// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lookahead step scheduler.
//!
//! Audio timing must not depend on the precision of the tick interval:
//! each tick schedules every step falling inside a short lookahead
//! window against the audio clock, using the *scheduled* step time (not
//! "now") as each voice's start time. The coarse tick only has to keep
//! the window ahead of real time; sample accuracy comes from the clock.

use std::time::Duration;

use tracing::debug;

use crate::audio::AudioBackend;
use crate::song::is_synth_track;

use super::PlayerState;

/// Seconds of audio scheduled ahead of the clock on every tick
pub const LOOKAHEAD: f64 = 0.1;

/// Wall-clock pause between scheduler ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// Lead applied to a freshly created context's first step
pub const SCHEDULE_LEAD: f64 = 0.05;

/// Time constant of the click-free stop ramp
pub const STOP_RAMP: f64 = 0.05;

/// Run one scheduler pass over the player state
///
/// Retires a previous context whose fade deadline has passed, then
/// schedules every step of the current context due inside the lookahead
/// window. The stop/supersession check is re-evaluated on every loop
/// iteration, not once per tick: a context stopped mid-burst must not
/// keep scheduling.
pub(crate) fn tick(state: &mut PlayerState, backend: &dyn AudioBackend) {
    let now = backend.now();

    let fade_expired = state
        .previous
        .as_ref()
        .map_or(false, |prev| prev.fade_deadline.map_or(true, |d| now >= d));
    if fade_expired {
        if let Some(mut prev) = state.previous.take() {
            prev.is_playing = false;
            backend.drop_bus(prev.bus);
            debug!("retired faded track context");
        }
    }

    let Some(ctx) = state.current.as_mut() else {
        return;
    };
    if !ctx.is_playing {
        return;
    }

    let step_duration = ctx.song.step_duration();
    while ctx.next_note_time < now + LOOKAHEAD {
        if !ctx.is_playing || ctx.generation != state.current_generation {
            return;
        }

        let step = ctx.step();
        if let Some(on_step) = state.on_step.as_mut() {
            on_step(step);
        }

        for trigger in ctx.index.triggers_at(ctx.current_step) {
            let params = ctx.song.voice_params(&trigger.track);
            if is_synth_track(&trigger.track) {
                backend.play_synth(&trigger.note, ctx.next_note_time, &params, ctx.bus);
            } else {
                backend.play_drum(
                    &trigger.note,
                    ctx.next_note_time,
                    params.drum_gain(),
                    ctx.bus,
                );
            }
        }

        ctx.current_step += 1;
        ctx.next_note_time += step_duration;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::audio::testing::MockBackend;
    use crate::audio::AudioBackend;
    use crate::player::context::TrackContext;
    use crate::song::{NoteTrigger, Song};

    fn state_with(song: Song, backend: &MockBackend) -> PlayerState {
        let bus = backend.create_bus();
        let ctx = TrackContext::new(song, bus, 1, backend.now() + SCHEDULE_LEAD);
        PlayerState {
            songs: HashMap::new(),
            current: Some(ctx),
            previous: None,
            current_generation: 1,
            muted: false,
            last_key: None,
            on_step: None,
        }
    }

    fn kick_song() -> Song {
        let mut song = Song::new(120.0);
        song.toggle(NoteTrigger::new("kick", "KICK", 0));
        song
    }

    #[test]
    fn test_kick_fires_at_initial_next_note_time() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);

        tick(&mut state, backend.as_ref());

        let drums = backend.drum_triggers();
        assert_eq!(drums.len(), 1);
        assert_eq!(drums[0].0, "KICK");
        assert!((drums[0].1 - SCHEDULE_LEAD).abs() < 1e-12);
    }

    #[test]
    fn test_silent_steps_schedule_nothing() {
        // Steps 1..63 are absent from the grid; play one full cycle
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);

        // 64 steps at 120 BPM span 8 seconds
        let mut elapsed = 0.0;
        while elapsed < 8.0 {
            tick(&mut state, backend.as_ref());
            backend.advance(0.025);
            elapsed += 0.025;
        }

        // Exactly the two cycle hits (step 0 and the wraparound)
        let drums = backend.drum_triggers();
        assert_eq!(drums.len(), 2);
        assert!((drums[1].1 - (SCHEDULE_LEAD + 8.0)).abs() < 1e-9);
    }

    #[test]
    fn test_scheduled_times_follow_step_duration() {
        let mut song = Song::new(120.0);
        for step in 0..4 {
            song.toggle(NoteTrigger::new("kick", "KICK", step));
        }
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(song, &backend);

        let mut elapsed = 0.0;
        while elapsed < 0.6 {
            tick(&mut state, backend.as_ref());
            backend.advance(0.025);
            elapsed += 0.025;
        }

        let drums = backend.drum_triggers();
        assert!(drums.len() >= 4);
        for (i, (_, start)) in drums.iter().take(4).enumerate() {
            let expected = SCHEDULE_LEAD + i as f64 * 0.125;
            assert!((start - expected).abs() < 1e-9, "hit {} at {}", i, start);
        }
    }

    #[test]
    fn test_synth_tracks_dispatch_to_synth_voice() {
        let mut song = Song::new(120.0);
        song.toggle(NoteTrigger::new("synth1", "A3", 0));
        song.toggle(NoteTrigger::new("snare", "SNARE", 0));
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(song, &backend);

        tick(&mut state, backend.as_ref());

        assert_eq!(backend.synth_triggers().len(), 1);
        assert_eq!(backend.drum_triggers().len(), 1);
    }

    #[test]
    fn test_stopped_context_schedules_nothing() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);
        state.current.as_mut().unwrap().is_playing = false;

        tick(&mut state, backend.as_ref());
        assert_eq!(backend.trigger_count(), 0);
    }

    #[test]
    fn test_superseded_generation_schedules_nothing() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);
        // A newer context has taken over the registration
        state.current_generation = 2;

        tick(&mut state, backend.as_ref());
        assert_eq!(backend.trigger_count(), 0);
    }

    #[test]
    fn test_observer_sees_wrapping_steps() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);

        let steps = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        state.on_step = Some(Box::new(move |step| sink.lock().unwrap().push(step)));

        let mut elapsed = 0.0;
        while elapsed < 8.2 {
            tick(&mut state, backend.as_ref());
            backend.advance(0.025);
            elapsed += 0.025;
        }

        let steps = steps.lock().unwrap();
        assert!(steps.len() > 64);
        for (i, &step) in steps.iter().enumerate() {
            assert_eq!(step, (i % 64) as u32);
        }
    }

    #[test]
    fn test_previous_context_retired_after_deadline() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);

        let prev_bus = backend.create_bus();
        let mut prev = TrackContext::new(kick_song(), prev_bus, 0, 0.0);
        prev.fade_deadline = Some(1.0);
        state.previous = Some(prev);

        tick(&mut state, backend.as_ref());
        assert!(state.previous.is_some());

        backend.set_now(1.0);
        tick(&mut state, backend.as_ref());
        assert!(state.previous.is_none());
        assert!(backend
            .events()
            .iter()
            .any(|e| matches!(e, crate::audio::testing::MockEvent::DropBus { bus } if *bus == prev_bus)));
    }

    #[test]
    fn test_next_note_time_strictly_increases() {
        let backend = Arc::new(MockBackend::new());
        let mut state = state_with(kick_song(), &backend);

        let mut last = 0.0;
        for _ in 0..40 {
            tick(&mut state, backend.as_ref());
            let next = state.current.as_ref().unwrap().next_note_time;
            assert!(next >= last);
            last = next;
            backend.advance(0.025);
        }
    }
}
