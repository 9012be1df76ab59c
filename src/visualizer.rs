//! Per-frame drivers for the ribbon and pillar pipelines.

use crate::audio::SpectrumSource;
use crate::error::Result;
use crate::params::{AnalyzerConfig, PillarLayout, RibbonStyle, SampleConfig};
use crate::pillars::PillarField;
use crate::ribbon::{LineStrip, RibbonMesh, RibbonMeshBuilder};
use crate::sink::{GeometrySink, LineStyle, Material, TransformSink};
use crate::spectrum::{HeightSample, SpectrumBuffer, SpectrumSampler};

/// Line graph with extruded, mirrored fill
pub struct LineFillVisualizer {
    sampler: SpectrumSampler,
    builder: RibbonMeshBuilder,
    analyzer: AnalyzerConfig,
    spectrum: SpectrumBuffer,
    material: Material,
    line_style: LineStyle,
}

impl LineFillVisualizer {
    pub fn new(sample: SampleConfig, style: RibbonStyle, analyzer: AnalyzerConfig) -> Self {
        let analyzer = analyzer.sanitized();
        let sample = sample.sanitized_for(analyzer.spectrum_size);
        let style = style.sanitized();

        Self {
            sampler: SpectrumSampler::new(sample),
            builder: RibbonMeshBuilder::new(style.fill_depth),
            spectrum: SpectrumBuffer::new(analyzer.spectrum_size),
            analyzer,
            material: Material::opaque(style.color),
            line_style: LineStyle {
                color: style.color,
                width: style.line_width,
            },
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Change the shared line/fill colour; applied from the next frame on
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.material.color = color;
        self.line_style.color = color;
    }

    /// Heights for the current buffer contents
    pub fn heights(&self) -> HeightSample {
        self.sampler.sample_all(&self.spectrum)
    }

    /// Pull a fresh spectrum, rebuild all geometry and hand it to the sink
    pub fn update(
        &mut self,
        source: &mut impl SpectrumSource,
        sink: &mut impl GeometrySink,
    ) -> Result<RibbonMesh> {
        source.get_spectrum(
            self.spectrum.as_mut_slice(),
            self.analyzer.channel,
            self.analyzer.window,
        )?;

        let heights = self.heights();
        let line = LineStrip::from_heights(&heights)?;
        let mesh = self.builder.build(&heights)?;

        sink.submit_line(line.positions(), &self.line_style);
        sink.submit_ribbon(&mesh, &self.material);
        Ok(mesh)
    }
}

/// Bank of smoothed pillars
pub struct PillarVisualizer {
    field: PillarField,
    analyzer: AnalyzerConfig,
    spectrum: SpectrumBuffer,
}

impl PillarVisualizer {
    pub fn new(sample: SampleConfig, layout: PillarLayout, analyzer: AnalyzerConfig) -> Self {
        let analyzer = analyzer.sanitized();
        Self {
            field: PillarField::new(
                layout.sanitized(),
                sample.sanitized_for(analyzer.spectrum_size),
            ),
            spectrum: SpectrumBuffer::new(analyzer.spectrum_size),
            analyzer,
        }
    }

    pub fn field(&self) -> &PillarField {
        &self.field
    }

    /// Rebuild the pillar set if count or layout changed
    pub fn reconfigure(&mut self, sample: SampleConfig, layout: PillarLayout) -> bool {
        let sample = sample.sanitized_for(self.analyzer.spectrum_size);
        self.field.reconfigure(layout.sanitized(), sample)
    }

    /// Pull a fresh spectrum, advance smoothing by `delta_s` and publish
    pub fn update(
        &mut self,
        source: &mut impl SpectrumSource,
        sink: &mut impl TransformSink,
        delta_s: f32,
    ) -> Result<()> {
        source.get_spectrum(
            self.spectrum.as_mut_slice(),
            self.analyzer.channel,
            self.analyzer.window,
        )?;

        self.field.update(&self.spectrum, delta_s);
        self.field.publish(sink);
        Ok(())
    }
}
