//! Audio system: cpal stream feeding a shared sample history.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use glicol::Engine;
use std::sync::{Arc, Mutex};

use super::fft::SpectrumAnalyzer;
use super::synthesis::GLICOL_COMPOSITION;
use super::{SampleHistory, SpectrumSource};
use crate::error::{Result, VisualizerError};
use crate::params::{audio_constants::BLOCK_SIZE, AnalyzerConfig, AudioSource, FftWindow};

/// Channels kept in the history (left, right)
const HISTORY_CHANNELS: usize = 2;

/// Live audio stream with on-demand spectrum analysis
pub struct AudioSystem {
    /// Most recent samples, written by the audio callback
    history: Arc<Mutex<SampleHistory>>,

    analyzer: SpectrumAnalyzer,

    /// Per-frame copy of one channel's history
    snapshot: Vec<f32>,

    device_rate_hz: u32,

    /// Audio stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the configured source and start streaming
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| VisualizerError::InvalidConfig(format!("analyzer: {}", e)))?;

        let capacity = config.fft_size() * 2;
        let history = Arc::new(Mutex::new(SampleHistory::new(HISTORY_CHANNELS, capacity)));

        let host = cpal::default_host();
        let (stream, device_rate_hz) = match config.source {
            AudioSource::Synth => synth_stream(&host, Arc::clone(&history))?,
            AudioSource::Input => input_stream(&host, Arc::clone(&history))?,
        };

        stream
            .play()
            .map_err(|e| VisualizerError::Audio(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self {
            history,
            analyzer: SpectrumAnalyzer::new(config.spectrum_size),
            snapshot: Vec::with_capacity(capacity),
            device_rate_hz,
            _stream: stream,
        })
    }

    /// Sample rate of the opened device (Hz)
    pub fn device_rate_hz(&self) -> u32 {
        self.device_rate_hz
    }
}

impl SpectrumSource for AudioSystem {
    fn get_spectrum(
        &mut self,
        buffer: &mut [f32],
        channel: usize,
        window: FftWindow,
    ) -> Result<()> {
        {
            let history = self
                .history
                .lock()
                .map_err(|_| VisualizerError::Audio("sample history poisoned".to_string()))?;
            history.copy_channel(channel, &mut self.snapshot);
        }

        self.analyzer.analyze(&self.snapshot, window, buffer);
        Ok(())
    }
}

fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "Unknown".to_string())
}

fn require_f32(format: cpal::SampleFormat) -> Result<()> {
    if format == cpal::SampleFormat::F32 {
        Ok(())
    } else {
        Err(VisualizerError::Audio(format!(
            "Unsupported sample format {:?} (need f32)",
            format
        )))
    }
}

/// Play the Glicol composition and record what is played
fn synth_stream(
    host: &cpal::Host,
    history: Arc<Mutex<SampleHistory>>,
) -> Result<(cpal::Stream, u32)> {
    let device = host
        .default_output_device()
        .ok_or_else(|| VisualizerError::Audio("No audio output device found".to_string()))?;

    let config = device
        .default_output_config()
        .map_err(|e| VisualizerError::Audio(format!("Failed to get audio config: {}", e)))?;
    require_f32(config.sample_format())?;

    let rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    tracing::info!("Audio out: {} @ {}Hz", device_name(&device), rate);

    let mut engine = Engine::<BLOCK_SIZE>::new();
    engine.set_sr(rate as usize);
    engine.update_with_code(GLICOL_COMPOSITION);
    engine
        .update()
        .map_err(|e| VisualizerError::Audio(format!("Glicol engine init failed: {:?}", e)))?;

    let mut played: Vec<f32> = Vec::with_capacity(BLOCK_SIZE * HISTORY_CHANNELS);

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames_needed = data.len() / channels;
                let mut frame_idx = 0;
                played.clear();

                // Generate multiple blocks if needed to fill the entire buffer
                while frame_idx < frames_needed {
                    let (buffers, _) = engine.next_block(vec![]);
                    let samples_to_copy = (frames_needed - frame_idx).min(BLOCK_SIZE);

                    for i in 0..samples_to_copy {
                        // Hard clip to ±0.5
                        let left = buffers[0][i].clamp(-0.5, 0.5);
                        let right = buffers[1][i].clamp(-0.5, 0.5);

                        let frame = &mut data[(frame_idx + i) * channels..][..channels];
                        for (c, out) in frame.iter_mut().enumerate() {
                            *out = match c {
                                0 => left,
                                1 => right,
                                _ => 0.0,
                            };
                        }
                        played.extend_from_slice(&[left, right]);
                    }

                    frame_idx += samples_to_copy;
                }

                if let Ok(mut history) = history.lock() {
                    history.push_interleaved(&played, HISTORY_CHANNELS);
                }
            },
            |err| tracing::warn!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| VisualizerError::Audio(format!("Failed to build audio stream: {}", e)))?;

    Ok((stream, rate))
}

/// Capture the default input device
fn input_stream(
    host: &cpal::Host,
    history: Arc<Mutex<SampleHistory>>,
) -> Result<(cpal::Stream, u32)> {
    let device = host
        .default_input_device()
        .ok_or_else(|| VisualizerError::Audio("No audio input device found".to_string()))?;

    let config = device
        .default_input_config()
        .map_err(|e| VisualizerError::Audio(format!("Failed to get input config: {}", e)))?;
    require_f32(config.sample_format())?;

    let rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    tracing::info!(
        "Audio in: {} @ {}Hz, {} channel(s)",
        device_name(&device),
        rate,
        channels
    );

    let stream = device
        .build_input_stream(
            &config.into(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut history) = history.lock() {
                    history.push_interleaved(data, channels);
                }
            },
            |err| tracing::warn!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| VisualizerError::Audio(format!("Failed to build input stream: {}", e)))?;

    Ok((stream, rate))
}
