//! Windowed FFT turning a sample block into spectrum magnitudes.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::FftWindow;

/// Window coefficient for sample `index` of a `size`-sample block
pub fn window_coefficient(window: FftWindow, index: usize, size: usize) -> f32 {
    match window {
        FftWindow::Rectangular => 1.0,
        FftWindow::Hann => hann_window(index, size),
        FftWindow::BlackmanHarris => blackman_harris_window(index, size),
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// 4-term Blackman-Harris window (-92 dB side lobes)
pub fn blackman_harris_window(index: usize, size: usize) -> f32 {
    const A0: f32 = 0.35875;
    const A1: f32 = 0.48829;
    const A2: f32 = 0.14128;
    const A3: f32 = 0.01168;

    let phase = 2.0 * PI * index as f32 / (size as f32 - 1.0);
    A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos() - A3 * (3.0 * phase).cos()
}

/// Reusable forward FFT of `2 * spectrum_size` samples
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: FftWindow,
    coefficients: Vec<f32>,
    window_sum: f32,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(spectrum_size: usize) -> Self {
        let fft_size = spectrum_size * 2;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let mut analyzer = Self {
            fft,
            fft_size,
            window: FftWindow::Rectangular,
            coefficients: Vec::new(),
            window_sum: 0.0,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
        };
        analyzer.set_window(FftWindow::BlackmanHarris);
        analyzer
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn set_window(&mut self, window: FftWindow) {
        self.window = window;
        self.coefficients = (0..self.fft_size)
            .map(|i| window_coefficient(window, i, self.fft_size))
            .collect();
        self.window_sum = self.coefficients.iter().sum();
    }

    /// Fill `magnitudes` from the most recent `fft_size` samples.
    ///
    /// Shorter input is zero padded at the front. Bin `k` receives
    /// `|X_k| / sum(window)`; bins beyond `fft_size / 2` are zeroed.
    pub fn analyze(&mut self, samples: &[f32], window: FftWindow, magnitudes: &mut [f32]) {
        if window != self.window {
            self.set_window(window);
        }

        let take = samples.len().min(self.fft_size);
        let pad = self.fft_size - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.coefficients[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let half = self.fft_size / 2;
        let norm = if self.window_sum > 0.0 {
            1.0 / self.window_sum
        } else {
            0.0
        };
        for (k, magnitude) in magnitudes.iter_mut().enumerate() {
            *magnitude = if k < half {
                self.scratch[k].norm() * norm
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_blackman_harris_window() {
        let size = 1024;

        // Near zero at the edges, ~1 in the middle
        assert!(blackman_harris_window(0, size) < 1e-3);
        assert!(blackman_harris_window(size - 1, size) < 1e-3);
        assert!((blackman_harris_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_pure_tone_peaks_at_its_bin() {
        let mut analyzer = SpectrumAnalyzer::new(512);
        let size = analyzer.fft_size();
        let bin = 40;
        let samples: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();

        let mut magnitudes = vec![0.0; 512];
        analyzer.analyze(&samples, FftWindow::BlackmanHarris, &mut magnitudes);

        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k);
        assert_eq!(peak, Some(bin));

        // Unit sine -> half amplitude after window-sum normalisation
        assert!((magnitudes[bin] - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_silence_and_short_input() {
        let mut analyzer = SpectrumAnalyzer::new(512);
        let mut magnitudes = vec![1.0; 512];

        analyzer.analyze(&[], FftWindow::Hann, &mut magnitudes);
        assert!(magnitudes.iter().all(|&m| m == 0.0));

        analyzer.analyze(&[0.0; 10], FftWindow::Rectangular, &mut magnitudes);
        assert!(magnitudes.iter().all(|&m| m == 0.0));
    }
}
