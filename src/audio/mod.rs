//! Spectrum sources: live audio streams analysed with a windowed FFT.

mod fft;
mod synthesis;
mod system;

pub use fft::{blackman_harris_window, hann_window, window_coefficient, SpectrumAnalyzer};
pub use system::AudioSystem;

use std::collections::VecDeque;

use crate::error::Result;
use crate::params::FftWindow;

/// Anything that can fill a magnitude buffer once per frame
pub trait SpectrumSource {
    /// Overwrite `buffer` with the current spectrum of `channel`
    fn get_spectrum(&mut self, buffer: &mut [f32], channel: usize, window: FftWindow)
        -> Result<()>;
}

/// Source that always reports silence; used when no audio device opens
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSource;

impl SpectrumSource for SilentSource {
    fn get_spectrum(
        &mut self,
        buffer: &mut [f32],
        _channel: usize,
        _window: FftWindow,
    ) -> Result<()> {
        buffer.fill(0.0);
        Ok(())
    }
}

/// Bounded per-channel history of the most recent samples
#[derive(Debug, Clone)]
pub struct SampleHistory {
    channels: Vec<VecDeque<f32>>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(channel_count: usize, capacity: usize) -> Self {
        Self {
            channels: vec![VecDeque::with_capacity(capacity); channel_count.max(1)],
            capacity,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Append one interleaved block, dropping the oldest samples past capacity.
    ///
    /// Frames narrower than the history (mono input) repeat their last
    /// sample into the remaining channels.
    pub fn push_interleaved(&mut self, data: &[f32], stride: usize) {
        let stride = stride.max(1);
        for frame in data.chunks_exact(stride) {
            for (c, history) in self.channels.iter_mut().enumerate() {
                let sample = frame[c.min(stride - 1)];
                if history.len() == self.capacity {
                    history.pop_front();
                }
                history.push_back(sample);
            }
        }
    }

    /// Copy the retained samples of `channel` (clamped to the last channel)
    pub fn copy_channel(&self, channel: usize, out: &mut Vec<f32>) {
        out.clear();
        let index = channel.min(self.channels.len() - 1);
        out.extend(self.channels[index].iter().copied());
    }
}
