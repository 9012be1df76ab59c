//! Seams between the geometry core and whatever draws it.

use glam::Vec3;

use crate::ribbon::RibbonMesh;

/// Surface appearance handed to a sink alongside the geometry it styles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA
    pub color: [f32; 4],
    /// Draw with alpha blending
    pub translucent: bool,
}

impl Material {
    pub fn opaque(color: [f32; 4]) -> Self {
        Self {
            color,
            translucent: false,
        }
    }

    /// Translucent variant of `color` with its alpha scaled by `alpha`
    pub fn translucent(color: [f32; 4], alpha: f32) -> Self {
        let [r, g, b, a] = color;
        Self {
            color: [r, g, b, a * alpha.clamp(0.0, 1.0)],
            translucent: true,
        }
    }
}

/// Stroke appearance for the outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: [f32; 4],
    /// World-space stroke width
    pub width: f32,
}

/// Placement of one pillar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

/// Consumer of the ribbon pipeline's output
pub trait GeometrySink {
    /// Outline positions, left to right
    fn submit_line(&mut self, positions: &[Vec3], style: &LineStyle);

    /// Fill solid for this frame
    fn submit_ribbon(&mut self, mesh: &RibbonMesh, material: &Material);
}

/// Consumer of the pillar pipeline's output
pub trait TransformSink {
    /// All pillar placements for this frame, indexed like the pillar field
    fn submit_transforms(&mut self, transforms: &[Transform], material: &Material);
}
