//! Audio capture and spectrum analysis configuration.

use serde::Deserialize;

use super::sample::SPECTRUM_SIZE;

/// Largest accepted spectrum size (FFT of 32768 samples)
pub const MAX_SPECTRUM_SIZE: usize = 16384;

/// Window applied to the sample block before the FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FftWindow {
    Rectangular,
    Hann,
    /// 4-term Blackman-Harris, low leakage for spectrum bars
    #[default]
    BlackmanHarris,
}

/// Where the analysed audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// Procedural Glicol composition played on the default output device
    #[default]
    Synth,

    /// Default input device (microphone or loopback)
    Input,
}

/// Spectrum analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Number of magnitude bins produced per frame (FFT size is twice this)
    pub spectrum_size: usize,

    /// Channel analysed (0 = left)
    pub channel: usize,

    /// Analysis window
    pub window: FftWindow,

    /// Audio origin
    pub source: AudioSource,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            spectrum_size: SPECTRUM_SIZE,
            channel: 0,
            window: FftWindow::BlackmanHarris,
            source: AudioSource::Synth,
        }
    }
}

impl AnalyzerConfig {
    /// FFT window size in samples
    pub fn fft_size(&self) -> usize {
        self.spectrum_size * 2
    }

    /// Validate configuration (spectrum size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.spectrum_size.is_power_of_two() {
            return Err(format!(
                "spectrum size must be power of 2, got {}",
                self.spectrum_size
            ));
        }
        if self.spectrum_size < 2 {
            return Err("spectrum size must be at least 2".to_string());
        }
        if self.spectrum_size > MAX_SPECTRUM_SIZE {
            return Err(format!(
                "spectrum size must be at most {}, got {}",
                MAX_SPECTRUM_SIZE, self.spectrum_size
            ));
        }
        Ok(())
    }

    /// Fall back to the default spectrum size when validation fails
    pub fn sanitized(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                tracing::warn!("{}, using {}", e, SPECTRUM_SIZE);
                Self {
                    spectrum_size: SPECTRUM_SIZE,
                    ..self
                }
            }
        }
    }

    /// Frequency at the centre of a magnitude bin (Hz)
    pub fn bin_to_hz(&self, bin: usize, device_rate_hz: u32) -> f32 {
        bin as f32 * device_rate_hz as f32 / self.fft_size() as f32
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 samples = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fft_size() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fft_size(), 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = AnalyzerConfig {
            spectrum_size: 500,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bin_to_hz() {
        let config = AnalyzerConfig::default();
        // 44100 / 1024 ≈ 43.07 Hz per bin
        assert!((config.bin_to_hz(1, 44100) - 43.066).abs() < 0.01);
        assert_eq!(config.bin_to_hz(0, 48000), 0.0);
    }

    #[test]
    fn test_sanitized_replaces_bad_sizes() {
        for spectrum_size in [0, 1, 500, 1 << 20] {
            let config = AnalyzerConfig {
                spectrum_size,
                window: FftWindow::Hann,
                ..AnalyzerConfig::default()
            }
            .sanitized();
            assert_eq!(config.spectrum_size, SPECTRUM_SIZE);
            assert_eq!(config.window, FftWindow::Hann);
        }

        let small = AnalyzerConfig {
            spectrum_size: 256,
            ..AnalyzerConfig::default()
        };
        assert_eq!(small.sanitized(), small);
    }
}
