// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use zsynth::audio::{self, Engine};
use zsynth::player::Player;
use zsynth::song::format;
use zsynth::synth::{VoiceParams, Waveform, INSTRUMENT_PRESETS};

fn print_usage() {
    println!("ZSYNTH - Step-Sequenced Music Playback Engine");
    println!();
    println!("Usage: zsynth [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-devices                List available audio output devices");
    println!("  --audition-drum <NAME> [VOL]  Play one drum hit (KICK, SNARE, ...) at VOL percent");
    println!("  --audition-note <NOTE> [WAVE] Play one synth note (e.g. A3) with a waveform");
    println!("  --play <FILE> [SECONDS]       Play a song JSON file for SECONDS (default 30)");
    println!("  --list-presets                List the instrument preset table");
    println!("  --help                        Show this help message");
}

fn list_devices() {
    let devices = audio::list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
        return;
    }
    println!("Audio output devices:");
    for (i, name) in devices.iter().enumerate() {
        let marker = if Some(name.as_str()) == audio::default_device_name().as_deref() {
            " (default)"
        } else {
            ""
        };
        println!("  {}: {}{}", i, name, marker);
    }
}

fn started_player() -> Result<(Player, zsynth::audio::AudioOutput)> {
    let engine = Engine::new();
    let output = engine.start()?;
    let mut player = Player::new(Arc::new(engine));
    player.start();
    Ok((player, output))
}

fn audition_drum(name: &str, volume: f64) -> Result<()> {
    let (player, _output) = started_player()?;

    println!("Auditioning drum {} at {}%...", name, volume);
    player.audition_drum(name, volume);

    // Let the transient ring out before the stream closes
    thread::sleep(Duration::from_millis(500));
    Ok(())
}

fn audition_note(note: &str, wave: Option<Waveform>) -> Result<()> {
    let (player, _output) = started_player()?;

    let mut params = VoiceParams::default();
    if let Some(wave) = wave {
        params.wave = wave;
    }

    println!("Auditioning note {} ({})...", note, params.wave.name());
    player.audition_synth(note, &params);

    thread::sleep(Duration::from_millis(800));
    Ok(())
}

fn play_file(path: &str, seconds: u64) -> Result<()> {
    let song = format::load_song(path)?;
    println!(
        "Playing {} ({} BPM, {} triggers) for {}s...",
        path,
        song.tempo,
        song.triggers.len(),
        seconds
    );

    let (player, _output) = started_player()?;
    player.set_on_step(|step| {
        if step % 16 == 0 {
            println!("Bar {}", step / 16 + 1);
        }
    });
    player.add_song("song", song);
    player.play("song", 0.0);

    thread::sleep(Duration::from_secs(seconds));
    player.stop();
    thread::sleep(Duration::from_millis(200));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("ZSYNTH - Step-Sequenced Music Playback Engine");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--list-devices" => {
            list_devices();
        }
        "--audition-drum" => {
            if args.len() < 3 {
                eprintln!("Error: --audition-drum requires a drum name");
                std::process::exit(1);
            }
            let volume: f64 = if args.len() >= 4 {
                args[3].parse().unwrap_or(80.0)
            } else {
                80.0
            };
            audition_drum(&args[2], volume)?;
        }
        "--audition-note" => {
            if args.len() < 3 {
                eprintln!("Error: --audition-note requires a note name (e.g. A3)");
                std::process::exit(1);
            }
            let wave = args.get(3).map(|name| {
                Waveform::from_name(name).unwrap_or_else(|| {
                    eprintln!("Unknown waveform {:?}, using square", name);
                    Waveform::Square
                })
            });
            audition_note(&args[2], wave)?;
        }
        "--play" => {
            if args.len() < 3 {
                eprintln!("Error: --play requires a song file path");
                std::process::exit(1);
            }
            let seconds: u64 = if args.len() >= 4 {
                args[3].parse().unwrap_or(30)
            } else {
                30
            };
            play_file(&args[2], seconds)?;
        }
        "--list-presets" => {
            println!("Instrument presets:");
            for preset in &INSTRUMENT_PRESETS {
                println!(
                    "  {:12} {:9} filter {:5} Hz  attack {:.3}s  release {:.2}s  detune {} ct",
                    preset.name,
                    preset.wave.name(),
                    preset.filter_hz,
                    preset.attack_s,
                    preset.release_s,
                    preset.detune_cents
                );
            }
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
