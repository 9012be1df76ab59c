//! Bank of independently smoothed spectrum pillars.

use glam::Vec3;

use crate::params::{PillarLayout, SampleConfig};
use crate::sink::{Material, Transform, TransformSink};
use crate::spectrum::{SpectrumBuffer, SpectrumSampler};

/// Alpha factor applied to the pillar colour for its translucent material
pub const PILLAR_ALPHA: f32 = 0.5;

/// Unity-style lerp: `t` is clamped to [0, 1]
pub fn lerp_step(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t.clamp(0.0, 1.0)
}

/// One pillar; only `scale.y` carries state between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pillar {
    pub position: Vec3,
    pub scale: Vec3,
    home: Vec3,
}

impl Pillar {
    fn new(home: Vec3, width: f32, height: f32) -> Self {
        Self {
            position: home,
            scale: Vec3::new(width, height, width),
            home,
        }
    }

    /// Position assigned at creation
    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            scale: self.scale,
        }
    }
}

/// Fixed set of pillars, recreated wholesale on reconfiguration
#[derive(Debug, Clone)]
pub struct PillarField {
    layout: PillarLayout,
    sample: SampleConfig,
    material: Material,
    pillars: Vec<Pillar>,
}

impl PillarField {
    /// Create `sample.amount` pillars at rest height `sample.min_height`
    pub fn new(layout: PillarLayout, sample: SampleConfig) -> Self {
        let pillars = Self::spawn(&layout, &sample);
        tracing::debug!("Created {} pillars", pillars.len());

        Self {
            material: Material::translucent(layout.pillar_color, PILLAR_ALPHA),
            layout,
            sample,
            pillars,
        }
    }

    fn spawn(layout: &PillarLayout, sample: &SampleConfig) -> Vec<Pillar> {
        let amount = sample.amount;
        let half = (amount / 2) as f32;
        let pitch = layout.pitch();

        (0..amount)
            .map(|i| {
                let home = Vec3::new((i as f32 - half) * pitch, 0.0, 0.0);
                Pillar::new(home, layout.pillar_width, sample.min_height)
            })
            .collect()
    }

    /// Apply a new layout/sampling configuration.
    ///
    /// Any change to pillar count or layout destroys every pillar and
    /// creates a fresh set; smoothing state is not carried over. Returns
    /// whether the set was rebuilt.
    pub fn reconfigure(&mut self, layout: PillarLayout, sample: SampleConfig) -> bool {
        let rebuild = layout != self.layout || sample.amount != self.sample.amount;
        self.sample = sample;

        if !rebuild {
            return false;
        }

        tracing::debug!(
            "Rebuilding pillars: {} -> {}",
            self.pillars.len(),
            sample.amount
        );
        *self = Self::new(layout, sample);
        true
    }

    /// Advance every pillar one frame toward its sampled height
    pub fn update(&mut self, spectrum: &SpectrumBuffer, delta_s: f32) {
        let sampler = SpectrumSampler::new(self.sample);
        let count = self.pillars.len();
        let t = self.layout.speed * delta_s;

        for (i, pillar) in self.pillars.iter_mut().enumerate() {
            let target = sampler.sample_with_count(spectrum, i, count);
            pillar.scale.y = lerp_step(pillar.scale.y, target, t);
            pillar.position = pillar.home;
        }
    }

    /// Hand every pillar's placement to the sink
    pub fn publish(&self, sink: &mut impl TransformSink) {
        let transforms: Vec<Transform> = self.pillars.iter().map(Pillar::transform).collect();
        sink.submit_transforms(&transforms, &self.material);
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    /// Mutable access for collaborators that move pillars between updates
    pub fn pillars_mut(&mut self) -> &mut [Pillar] {
        &mut self.pillars
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn layout(&self) -> &PillarLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }
}
