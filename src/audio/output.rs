// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Builds the output stream that pulls rendered frames from the graph
//! callback at a fixed buffer size.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};

use super::AudioError;

/// Audio output configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 2,
        }
    }
}

/// Audio output stream
pub struct AudioOutput {
    _stream: Stream,
    _device: Device,
    config: AudioConfig,
}

impl AudioOutput {
    /// Create a new audio output with a render callback
    ///
    /// The callback receives the interleaved buffer and the channel count
    /// and is expected to fill every sample.
    pub fn new<F>(config: AudioConfig, mut callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let channels = config.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        *sample = 0.0;
                    }
                    callback(data, channels);
                },
                move |err| {
                    tracing::error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("failed to start stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
        })
    }

    /// Get current configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Output latency of one buffer in milliseconds
    pub fn latency_ms(&self) -> f64 {
        (self.config.buffer_size as f64 / self.config.sample_rate as f64) * 1000.0
    }
}

/// List available audio output device names
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Name of the default output device, if any
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}
