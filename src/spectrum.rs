//! Spectrum buffer and point-to-bin sampling shared by both pipelines.

use crate::params::{SampleConfig, SPECTRUM_SIZE};

/// Fixed-length magnitude buffer, overwritten wholesale once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumBuffer {
    bins: Vec<f32>,
}

impl SpectrumBuffer {
    /// Zeroed buffer with `size` bins
    pub fn new(size: usize) -> Self {
        Self {
            bins: vec![0.0; size],
        }
    }

    /// Buffer holding a copy of `bins`
    pub fn from_slice(bins: &[f32]) -> Self {
        Self {
            bins: bins.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.bins
    }

    /// Writable view handed to the spectrum source
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.bins
    }
}

impl Default for SpectrumBuffer {
    fn default() -> Self {
        Self::new(SPECTRUM_SIZE)
    }
}

/// One clamped height per graph point, recomputed every frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeightSample {
    heights: Vec<f32>,
}

impl HeightSample {
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.heights
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.heights.iter()
    }
}

impl From<Vec<f32>> for HeightSample {
    fn from(heights: Vec<f32>) -> Self {
        Self { heights }
    }
}

impl std::ops::Index<usize> for HeightSample {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.heights[index]
    }
}

/// Maps graph point indices to spectrum bins and applies gain + clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSampler {
    config: SampleConfig,
}

impl SpectrumSampler {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Spectrum bin read for point `index` out of `count` points.
    ///
    /// The point index is normalised by `count`, not `count - 1`, so the
    /// last point never reaches the end of the configured bin window.
    pub fn bin_index(&self, index: usize, count: usize, spectrum_size: usize) -> usize {
        let offset = self.config.spectrum_offset;
        let range = self.config.spectrum_range.max(1);

        let normalized = index as f32 / count.max(1) as f32;
        let raw = offset.saturating_add((normalized * range as f32) as usize);

        raw.clamp(offset, offset.saturating_add(range - 1))
            .min(spectrum_size.saturating_sub(1))
    }

    /// Height for point `index` using the configured point count
    pub fn sample(&self, spectrum: &SpectrumBuffer, index: usize) -> f32 {
        self.sample_with_count(spectrum, index, self.config.amount)
    }

    /// Height for point `index` normalised by an explicit point count
    pub fn sample_with_count(
        &self,
        spectrum: &SpectrumBuffer,
        index: usize,
        count: usize,
    ) -> f32 {
        let magnitude = if spectrum.is_empty() {
            0.0
        } else {
            spectrum.as_slice()[self.bin_index(index, count, spectrum.len())]
        };

        let height = magnitude * self.config.sensitivity;
        if height.is_nan() {
            return self.config.min_height;
        }
        height.clamp(self.config.min_height, self.config.max_height)
    }

    /// Heights for every configured graph point
    pub fn sample_all(&self, spectrum: &SpectrumBuffer) -> HeightSample {
        (0..self.config.amount)
            .map(|i| self.sample(spectrum, i))
            .collect::<Vec<_>>()
            .into()
    }
}
