// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for Zsynth
//!
//! These tests drive the public playback API end to end against the fake
//! audio backend: exact trigger timing, crossfade gain behavior, and
//! track lifecycle across play/stop/mute transitions.

use std::sync::{Arc, Mutex};

use zsynth::audio::testing::{MockBackend, MockEvent};
use zsynth::audio::{AudioBackend, Graph};
use zsynth::player::{Player, SCHEDULE_LEAD};
use zsynth::song::{NoteTrigger, Song, SongDoc};
use zsynth::synth::{VoiceParams, SILENT_FLOOR};

fn kick_song(bpm: f64) -> Song {
    let mut song = Song::new(bpm);
    song.toggle(NoteTrigger::new("kick", "KICK", 0));
    song
}

fn player_with(backend: &Arc<MockBackend>, songs: &[(&str, Song)]) -> Player {
    let player = Player::new(Arc::clone(backend) as Arc<dyn AudioBackend>);
    for (key, song) in songs {
        player.add_song(*key, song.clone());
    }
    player
}

/// Drive the scheduler the way the tick thread would, against a manual clock
fn run_for(player: &Player, backend: &MockBackend, seconds: f64) {
    let mut elapsed = 0.0;
    while elapsed < seconds {
        player.pump();
        backend.advance(0.025);
        elapsed += 0.025;
    }
}

#[test]
fn test_kick_pattern_schedules_on_the_grid() {
    // The documented minimal song: {"kick-KICK-0": true} at 120 BPM
    let doc = r#"{ "bpm": "120", "activeData": { "kick-KICK-0": true }, "config": {} }"#;
    let song = SongDoc::from_json(doc).unwrap().decode().unwrap();

    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("title", song)]);

    player.play("title", 0.0);
    run_for(&player, &backend, 8.0);

    // Step 0 fires at the context's initial next-note time; steps 1-63
    // are absent and schedule zero triggers until the cycle wraps
    let drums = backend.drum_triggers();
    assert_eq!(drums.len(), 2);
    assert_eq!(drums[0].0, "KICK");
    assert!((drums[0].1 - SCHEDULE_LEAD).abs() < 1e-12);
    assert!((drums[1].1 - (SCHEDULE_LEAD + 8.0)).abs() < 1e-9);
}

#[test]
fn test_sixteenth_note_step_duration() {
    // stepDuration = 60 / bpm / 4; at 120 BPM that is 125 ms
    let mut song = Song::new(120.0);
    assert!((song.step_duration() - 0.125).abs() < 1e-12);

    for step in [0, 1, 2, 3] {
        song.toggle(NoteTrigger::new("hat", "HAT", step));
    }

    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("title", song)]);
    player.play("title", 0.0);
    run_for(&player, &backend, 1.0);

    let drums = backend.drum_triggers();
    for (i, (_, start)) in drums.iter().take(4).enumerate() {
        assert!((start - (SCHEDULE_LEAD + i as f64 * 0.125)).abs() < 1e-9);
    }
}

#[test]
fn test_steps_beyond_cycle_fold_onto_the_grid() {
    // Triggers at step 64 and step 0 are indistinguishable in scheduling
    let mut at_zero = Song::new(120.0);
    at_zero.toggle(NoteTrigger::new("kick", "KICK", 0));
    let mut at_cycle = Song::new(120.0);
    at_cycle.toggle(NoteTrigger::new("kick", "KICK", 64));

    for song in [at_zero, at_cycle] {
        let backend = Arc::new(MockBackend::new());
        let player = player_with(&backend, &[("s", song)]);
        player.play("s", 0.0);
        run_for(&player, &backend, 0.5);

        let drums = backend.drum_triggers();
        assert_eq!(drums.len(), 1);
        assert!((drums[0].1 - SCHEDULE_LEAD).abs() < 1e-12);
    }
}

#[test]
fn test_observer_reports_each_scheduled_step() {
    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("title", kick_song(120.0))]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    player.set_on_step(move |step| sink.lock().unwrap().push(step));

    player.play("title", 0.0);
    run_for(&player, &backend, 2.0);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    for (i, &step) in seen.iter().enumerate() {
        assert_eq!(step, (i % 64) as u32);
    }
}

#[test]
fn test_supersession_stops_old_context_scheduling() {
    let mut verse = Song::new(120.0);
    verse.toggle(NoteTrigger::new("kick", "KICK", 0));
    let mut chorus = Song::new(120.0);
    chorus.toggle(NoteTrigger::new("synth1", "A3", 0));

    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("verse", verse), ("chorus", chorus)]);

    player.play("verse", 0.5);
    run_for(&player, &backend, 1.0);
    let drums_before = backend.drum_triggers().len();

    player.play("chorus", 0.5);
    run_for(&player, &backend, 8.0);

    // The demoted verse schedules no further kicks; the chorus synth runs
    assert_eq!(backend.drum_triggers().len(), drums_before);
    assert!(!backend.synth_triggers().is_empty());
}

#[test]
fn test_stop_then_play_yields_one_current_context() {
    let backend = Arc::new(MockBackend::new());
    let player = player_with(
        &backend,
        &[("a", kick_song(120.0)), ("b", kick_song(140.0))],
    );

    player.play("a", 0.5);
    player.stop();
    player.play("b", 0.5);

    assert!(player.is_playing());
    // Only one fade-in per play call, and no dangling fade-out from the
    // stopped context
    let fade_ins = backend
        .events()
        .iter()
        .filter(|e| matches!(e, MockEvent::FadeIn { .. }))
        .count();
    assert_eq!(fade_ins, 2);
}

#[test]
fn test_detune_spawns_exactly_one_partner() {
    // Graph-level check: 0 detune renders one oscillator per note,
    // nonzero detune exactly two, through the same filter
    let mut graph = Graph::new(44100);

    let flat = VoiceParams::default();
    graph.spawn_synth("A3", 0.0, &flat, zsynth::BusId::MASTER);
    assert_eq!(graph.voice_count(), 1);

    let detuned = VoiceParams {
        detune_cents: 8.0,
        ..Default::default()
    };
    graph.spawn_synth("A3", 0.0, &detuned, zsynth::BusId::MASTER);
    assert_eq!(graph.voice_count(), 2);

    // Both voices retire after their envelope plus tail
    let frames = (44100.0f64 * 0.5) as usize;
    let mut buffer = vec![0.0f32; frames];
    graph.render(&mut buffer, 1);
    assert_eq!(graph.voice_count(), 0);
    assert!(buffer.iter().any(|&s| s.abs() > 0.001));
}

#[test]
fn test_crossfade_gains_meet_at_the_deadline() {
    // At time T after play(), the incoming bus is at full volume and the
    // outgoing bus is silent, for any T in (0, 5]
    for fade in [0.05, 0.25, 1.0, 5.0] {
        let mut graph = Graph::new(44100);
        let old = graph.create_bus();
        let new = graph.create_bus();
        graph.fade_in(old, 0.0, 0.0);

        graph.fade_out(old, 0.0, fade);
        graph.fade_in(new, 0.0, fade);

        assert!((graph.bus_gain_at(new, fade) - 1.0).abs() < 1e-9, "fade {}", fade);
        assert!(graph.bus_gain_at(old, fade) <= SILENT_FLOOR + 1e-9, "fade {}", fade);

        // Midway through, both carry signal: the overlap is intentional
        let mid_old = graph.bus_gain_at(old, fade / 2.0);
        let mid_new = graph.bus_gain_at(new, fade / 2.0);
        assert!(mid_old > SILENT_FLOOR && mid_old < 1.0);
        assert!(mid_new > SILENT_FLOOR && mid_new < 1.0);
    }
}

#[test]
fn test_zero_crossfade_cuts_immediately() {
    let mut graph = Graph::new(44100);
    let old = graph.create_bus();
    let new = graph.create_bus();
    graph.fade_in(old, 0.0, 0.0);

    graph.fade_out(old, 1.0, 0.0);
    graph.fade_in(new, 1.0, 0.0);

    assert!(graph.bus_gain_at(old, 1.0) <= SILENT_FLOOR);
    assert!((graph.bus_gain_at(new, 1.0) - 1.0).abs() < 1e-9);
    // No overlap window exists at all
    assert!((graph.bus_gain_at(old, 0.999) - 1.0).abs() < 1e-9);
}

#[test]
fn test_toggle_round_trip_preserves_song() {
    let mut song = kick_song(120.0);
    let before = song.clone();

    let extra = NoteTrigger::new("synth2", "C4", 17);
    song.toggle(extra.clone());
    song.toggle(extra);

    assert_eq!(song, before);
}

#[test]
fn test_wire_format_round_trip_through_player() {
    let doc = r#"{
        "bpm": "90",
        "activeData": { "synth1-E3-0": true, "synth1-G3-8": true },
        "config": { "synth1": { "vol": 70, "wave": "triangle", "inst": "pad_warm" } }
    }"#;
    let song = SongDoc::from_json(doc).unwrap().decode().unwrap();

    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("imported", song)]);
    player.play("imported", 0.0);
    run_for(&player, &backend, 3.0);

    let synths = backend.synth_triggers();
    assert_eq!(synths.len(), 2);
    assert_eq!(synths[0].0, "E3");
    assert_eq!(synths[1].0, "G3");
    // 90 BPM: one step is 60/90/4 s; step 8 lands 8 steps after step 0
    let step = 60.0 / 90.0 / 4.0;
    assert!((synths[1].1 - (SCHEDULE_LEAD + 8.0 * step)).abs() < 1e-9);

    // Per-track config resolved with the preset underneath explicit fields
    let params = match &backend.events()[..] {
        [.., MockEvent::Synth { params, .. }] => *params,
        _ => panic!("expected a synth event"),
    };
    assert_eq!(params.volume, 70.0);
    assert_eq!(params.wave, zsynth::Waveform::Triangle);
    assert_eq!(params.attack_s, 0.12); // from the pad_warm preset
}

#[test]
fn test_mute_unmute_restarts_from_the_top() {
    let backend = Arc::new(MockBackend::new());
    let player = player_with(&backend, &[("theme", kick_song(120.0))]);

    player.play("theme", 0.0);
    run_for(&player, &backend, 1.0);
    assert!(player.current_step().unwrap() > 0);

    player.mute();
    assert!(!player.is_playing());

    player.unmute();
    assert!(player.is_playing());
    assert_eq!(player.current_step(), Some(0));
}
