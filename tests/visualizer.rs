//! Frame drivers exercised against in-memory sources and recording sinks.

use glam::Vec3;
use std::f32::consts::PI;

use audioribbon::audio::{SilentSource, SpectrumAnalyzer, SpectrumSource};
use audioribbon::error::Result;
use audioribbon::params::{AnalyzerConfig, FftWindow, PillarLayout, RibbonStyle, SampleConfig};
use audioribbon::pillars::PILLAR_ALPHA;
use audioribbon::ribbon::RibbonMesh;
use audioribbon::sink::{GeometrySink, LineStyle, Material, Transform, TransformSink};
use audioribbon::visualizer::{LineFillVisualizer, PillarVisualizer};

/// Every bin holds the same magnitude
struct FlatSource(f32);

impl SpectrumSource for FlatSource {
    fn get_spectrum(
        &mut self,
        buffer: &mut [f32],
        _channel: usize,
        _window: FftWindow,
    ) -> Result<()> {
        buffer.fill(self.0);
        Ok(())
    }
}

/// Pure sine centred on one FFT bin, run through the real analyzer
struct ToneSource {
    analyzer: SpectrumAnalyzer,
    samples: Vec<f32>,
}

impl ToneSource {
    fn new(spectrum_size: usize, bin: usize) -> Self {
        let analyzer = SpectrumAnalyzer::new(spectrum_size);
        let size = analyzer.fft_size();
        let samples = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();
        Self { analyzer, samples }
    }
}

impl SpectrumSource for ToneSource {
    fn get_spectrum(
        &mut self,
        buffer: &mut [f32],
        _channel: usize,
        window: FftWindow,
    ) -> Result<()> {
        self.analyzer.analyze(&self.samples, window, buffer);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    lines: Vec<(Vec<Vec3>, LineStyle)>,
    ribbons: Vec<(RibbonMesh, Material)>,
    transforms: Vec<(Vec<Transform>, Material)>,
}

impl GeometrySink for RecordingSink {
    fn submit_line(&mut self, positions: &[Vec3], style: &LineStyle) {
        self.lines.push((positions.to_vec(), *style));
    }

    fn submit_ribbon(&mut self, mesh: &RibbonMesh, material: &Material) {
        self.ribbons.push((mesh.clone(), *material));
    }
}

impl TransformSink for RecordingSink {
    fn submit_transforms(&mut self, transforms: &[Transform], material: &Material) {
        self.transforms.push((transforms.to_vec(), *material));
    }
}

fn four_point_config() -> SampleConfig {
    SampleConfig {
        amount: 4,
        sensitivity: 1.0,
        min_height: 0.0,
        max_height: 10.0,
        spectrum_offset: 0,
        spectrum_range: 4,
    }
}

#[test]
fn test_flat_spectrum_ribbon_frame() {
    let mut visualizer = LineFillVisualizer::new(
        four_point_config(),
        RibbonStyle::default(),
        AnalyzerConfig::default(),
    );
    let mut sink = RecordingSink::default();

    let mesh = visualizer.update(&mut FlatSource(0.5), &mut sink).unwrap();

    assert_eq!(visualizer.heights().as_slice(), &[0.5; 4]);
    assert_eq!(mesh.vertices.len(), 64);

    // Front strip tops, then their mirrored copies
    for i in 0..4u32 {
        assert_eq!(mesh.position(2 * i + 1).y, 0.5);
        assert_eq!(mesh.position(32 + 2 * i + 1).y, -0.5);
    }

    assert_eq!(sink.lines.len(), 1);
    assert_eq!(sink.ribbons.len(), 1);
    let (line, style) = &sink.lines[0];
    assert_eq!(line.len(), 4);
    assert!(line.iter().all(|p| p.y == 0.5 && p.z == 0.0));
    assert_eq!(style.color, sink.ribbons[0].1.color);
    assert_eq!(sink.ribbons[0].0, mesh);
}

#[test]
fn test_ribbon_winding_and_mirror() {
    let mut visualizer = LineFillVisualizer::new(
        four_point_config(),
        RibbonStyle::default(),
        AnalyzerConfig::default(),
    );
    let mesh = visualizer
        .update(&mut FlatSource(2.0), &mut RecordingSink::default())
        .unwrap();

    let n = 4;
    let half_vertices = mesh.half_vertex_count() as u32;
    let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
    let half = triangles.len() / 2;
    let face_tris = (n - 1) * 2;

    // Front faces toward -Z, back toward +Z
    for &tri in &triangles[..face_tris] {
        assert!(mesh.face_normal(tri).z < 0.0);
    }
    for &tri in &triangles[face_tris..2 * face_tris] {
        assert!(mesh.face_normal(tri).z > 0.0);
    }

    // Mirrored triangles reflect the original normal across y = 0
    for (original, mirrored) in triangles[..half].iter().zip(&triangles[half..]) {
        let a = mesh.face_normal(*original);
        let b = mesh.face_normal(*mirrored);
        assert!((a.x - b.x).abs() < 1e-4);
        assert!((a.y + b.y).abs() < 1e-4);
        assert!((a.z - b.z).abs() < 1e-4);
        assert!(mirrored.iter().all(|&i| i >= half_vertices));
    }

    // Top skirt of the upper half faces up, its mirror faces down
    let top_skirt = triangles[..half]
        .iter()
        .filter(|tri| tri.iter().all(|&i| mesh.position(i).y == 2.0))
        .map(|&tri| mesh.face_normal(tri))
        .filter(|normal| normal.length() > 0.0);
    let mut seen = 0;
    for normal in top_skirt {
        assert!(normal.y > 0.0);
        seen += 1;
    }
    assert_eq!(seen, (n - 1) * 2);
}

#[test]
fn test_color_change_applies_to_line_and_fill() {
    let mut visualizer = LineFillVisualizer::new(
        four_point_config(),
        RibbonStyle::default(),
        AnalyzerConfig::default(),
    );
    let mut sink = RecordingSink::default();

    visualizer.set_color([1.0, 0.0, 0.5, 1.0]);
    visualizer.update(&mut SilentSource, &mut sink).unwrap();

    assert_eq!(sink.lines[0].1.color, [1.0, 0.0, 0.5, 1.0]);
    assert_eq!(sink.ribbons[0].1.color, [1.0, 0.0, 0.5, 1.0]);
    assert!(!sink.ribbons[0].1.translucent);
}

#[test]
fn test_silence_rests_at_min_height() {
    let sample = SampleConfig {
        min_height: 0.25,
        ..SampleConfig::default()
    };
    let mut visualizer =
        LineFillVisualizer::new(sample, RibbonStyle::default(), AnalyzerConfig::default());
    let mut sink = RecordingSink::default();

    visualizer.update(&mut SilentSource, &mut sink).unwrap();

    let (line, _) = &sink.lines[0];
    assert_eq!(line.len(), sample.amount);
    assert!(line.iter().all(|p| p.y == 0.25));
}

#[test]
fn test_tone_raises_its_own_column() {
    let sample = SampleConfig {
        amount: 128,
        sensitivity: 20.0,
        min_height: 0.0,
        max_height: 20.0,
        spectrum_offset: 0,
        spectrum_range: 128,
    };
    let analyzer = AnalyzerConfig::default();
    let mut visualizer = LineFillVisualizer::new(sample, RibbonStyle::default(), analyzer);
    let mut source = ToneSource::new(analyzer.spectrum_size, 40);

    visualizer
        .update(&mut source, &mut RecordingSink::default())
        .unwrap();

    let heights = visualizer.heights();
    let peak = heights
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    assert_eq!(peak, Some(40));
    assert!((heights[40] - 10.0).abs() < 1.0);
    assert!(heights[100] < 0.1);
}

#[test]
fn test_pillar_frame_smooths_and_publishes() {
    let sample = SampleConfig {
        amount: 6,
        sensitivity: 20.0,
        min_height: 0.0,
        max_height: 20.0,
        spectrum_offset: 0,
        spectrum_range: 6,
    };
    let layout = PillarLayout {
        speed: 5.0,
        ..PillarLayout::default()
    };
    let mut visualizer = PillarVisualizer::new(sample, layout, AnalyzerConfig::default());
    let mut sink = RecordingSink::default();

    visualizer
        .update(&mut FlatSource(0.5), &mut sink, 0.1)
        .unwrap();

    assert_eq!(sink.transforms.len(), 1);
    let (transforms, material) = &sink.transforms[0];
    assert_eq!(transforms.len(), 6);
    assert!(material.translucent);
    assert_eq!(material.color[3], layout.pillar_color[3] * PILLAR_ALPHA);

    for (transform, pillar) in transforms.iter().zip(visualizer.field().pillars()) {
        assert!((transform.scale.y - 5.0).abs() < 1e-5);
        assert_eq!(transform.scale.x, layout.pillar_width);
        assert_eq!(transform.position, pillar.home());
    }

    // Centred on amount / 2
    let pitch = layout.pitch();
    assert!((transforms[3].position.x).abs() < 1e-6);
    assert!((transforms[0].position.x + 3.0 * pitch).abs() < 1e-5);
}

#[test]
fn test_pillar_reconfigure_only_on_change() {
    let sample = SampleConfig::default();
    let layout = PillarLayout::default();
    let mut visualizer = PillarVisualizer::new(sample, layout, AnalyzerConfig::default());

    visualizer
        .update(&mut FlatSource(1.0), &mut RecordingSink::default(), 0.05)
        .unwrap();
    let grown = visualizer.field().pillars()[0].scale.y;
    assert!(grown > sample.min_height);

    assert!(!visualizer.reconfigure(sample, layout));
    assert_eq!(visualizer.field().pillars()[0].scale.y, grown);

    let fewer = SampleConfig {
        amount: 10,
        ..sample
    };
    assert!(visualizer.reconfigure(fewer, layout));
    assert_eq!(visualizer.field().len(), 10);
    assert!(visualizer
        .field()
        .pillars()
        .iter()
        .all(|p| p.scale.y == sample.min_height));
}

#[test]
fn test_bad_spectrum_size_falls_back() {
    let analyzer = AnalyzerConfig {
        spectrum_size: 0,
        ..AnalyzerConfig::default()
    };
    let mut visualizer =
        LineFillVisualizer::new(four_point_config(), RibbonStyle::default(), analyzer);
    let mut sink = RecordingSink::default();

    visualizer.update(&mut FlatSource(0.5), &mut sink).unwrap();

    assert_eq!(visualizer.heights().as_slice(), &[0.5; 4]);
}
