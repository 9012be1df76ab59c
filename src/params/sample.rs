//! Spectrum sampling parameters.

use serde::Deserialize;

/// Number of magnitude bins the spectrum source delivers per frame
pub const SPECTRUM_SIZE: usize = 512;

/// How graph points map onto spectrum bins and how magnitudes become heights
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Number of graph points (must be at least 2)
    pub amount: usize,

    /// Gain applied to raw magnitudes (world units per unit magnitude)
    pub sensitivity: f32,

    /// Lower clamp for a sampled height (world units)
    pub min_height: f32,

    /// Upper clamp for a sampled height (world units)
    pub max_height: f32,

    /// First spectrum bin used by the graph
    pub spectrum_offset: usize,

    /// Number of bins the graph spreads across
    pub spectrum_range: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            amount: 64,
            sensitivity: 120.0,
            min_height: 0.1,
            max_height: 20.0,
            spectrum_offset: 0,
            spectrum_range: 128,
        }
    }
}

impl SampleConfig {
    /// Smallest point count that still forms one quad
    pub const MIN_AMOUNT: usize = 2;

    /// Replace values that would break sampling or layout with safe ones.
    ///
    /// Never fails; every correction is logged at warn level.
    pub fn sanitized(self) -> Self {
        self.sanitized_for(SPECTRUM_SIZE)
    }

    /// Same as [`SampleConfig::sanitized`], checking the bin window against
    /// a spectrum of `spectrum_size` bins.
    pub fn sanitized_for(self, spectrum_size: usize) -> Self {
        let defaults = Self::default();
        let mut config = self;

        if config.amount < Self::MIN_AMOUNT {
            tracing::warn!(
                "amount {} is below {}, raising it",
                config.amount,
                Self::MIN_AMOUNT
            );
            config.amount = Self::MIN_AMOUNT;
        }

        if !config.sensitivity.is_finite() || config.sensitivity <= 0.0 {
            tracing::warn!(
                "sensitivity {} must be positive, using {}",
                config.sensitivity,
                defaults.sensitivity
            );
            config.sensitivity = defaults.sensitivity;
        }

        if !config.min_height.is_finite() || config.min_height < 0.0 {
            tracing::warn!("min_height {} is invalid, using 0", config.min_height);
            config.min_height = 0.0;
        }

        if !config.max_height.is_finite() {
            tracing::warn!(
                "max_height {} is invalid, using {}",
                config.max_height,
                defaults.max_height
            );
            config.max_height = defaults.max_height.max(config.min_height);
        }

        if config.min_height > config.max_height {
            tracing::warn!(
                "min_height {} exceeds max_height {}, swapping",
                config.min_height,
                config.max_height
            );
            std::mem::swap(&mut config.min_height, &mut config.max_height);
        }

        if config.spectrum_range == 0 {
            tracing::warn!(
                "spectrum_range must be positive, using {}",
                defaults.spectrum_range
            );
            config.spectrum_range = defaults.spectrum_range;
        }

        // Out-of-range windows are tolerated: the sampler clamps bin indices.
        let window_end = config.spectrum_offset.saturating_add(config.spectrum_range);
        if window_end > spectrum_size {
            tracing::warn!(
                "spectrum window {}..{} runs past {} bins; indices will be clamped",
                config.spectrum_offset,
                window_end,
                spectrum_size
            );
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_already_sane() {
        let config = SampleConfig::default();
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_amount_raised_to_two() {
        for amount in [0, 1] {
            let config = SampleConfig {
                amount,
                ..SampleConfig::default()
            }
            .sanitized();
            assert_eq!(config.amount, 2);
        }
    }

    #[test]
    fn test_inverted_height_bounds_swapped() {
        let config = SampleConfig {
            min_height: 5.0,
            max_height: 1.0,
            ..SampleConfig::default()
        }
        .sanitized();
        assert_eq!(config.min_height, 1.0);
        assert_eq!(config.max_height, 5.0);
    }

    #[test]
    fn test_non_positive_gain_and_range_defaulted() {
        let config = SampleConfig {
            sensitivity: -3.0,
            spectrum_range: 0,
            ..SampleConfig::default()
        }
        .sanitized();
        assert_eq!(config.sensitivity, 120.0);
        assert_eq!(config.spectrum_range, 128);
    }

    #[test]
    fn test_oversized_window_is_kept() {
        let config = SampleConfig {
            spectrum_offset: 500,
            spectrum_range: 64,
            ..SampleConfig::default()
        }
        .sanitized();
        assert_eq!(config.spectrum_offset, 500);
        assert_eq!(config.spectrum_range, 64);
    }

    #[test]
    fn test_infinite_gain_defaulted() {
        for sensitivity in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let config = SampleConfig {
                sensitivity,
                ..SampleConfig::default()
            }
            .sanitized();
            assert_eq!(config.sensitivity, 120.0);
        }
    }

    #[test]
    fn test_offset_near_usize_max_does_not_overflow() {
        let config = SampleConfig {
            spectrum_offset: usize::MAX - 10,
            ..SampleConfig::default()
        }
        .sanitized();
        assert_eq!(config.spectrum_offset, usize::MAX - 10);
        assert_eq!(config.spectrum_range, 128);
    }
}
