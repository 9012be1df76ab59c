//! Outline stroke positions.

use glam::{Vec2, Vec3};

use super::ColumnLayout;
use crate::error::{Result, VisualizerError};
use crate::spectrum::HeightSample;

/// Sampled graph points, left to right, on the z = 0 plane
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineStrip {
    positions: Vec<Vec3>,
}

impl LineStrip {
    /// Lay the heights out on the shared X layout
    pub fn from_heights(heights: &HeightSample) -> Result<Self> {
        if heights.len() < 2 {
            return Err(VisualizerError::TooFewPoints(heights.len()));
        }

        let layout = ColumnLayout::new(heights.len());
        let positions = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| Vec3::new(layout.x(i), h, 0.0))
            .collect();

        Ok(Self { positions })
    }

    /// Wrap already laid-out points (e.g. from a geometry sink)
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Expand the polyline into constant-width quads (triangle list).
    ///
    /// Each vertex is pushed along the mitered normal of its two segments so
    /// neighbouring quads share edges without gaps.
    pub fn outline_quads(&self, width: f32) -> Vec<Vec3> {
        if self.positions.len() < 2 {
            return Vec::new();
        }

        let half = width / 2.0;
        let points: Vec<Vec2> = self.positions.iter().map(|p| p.truncate()).collect();
        let last = points.len() - 1;

        let offsets: Vec<Vec2> = (0..points.len())
            .map(|i| {
                let incoming = (points[i] - points[i.saturating_sub(1)]).normalize_or_zero();
                let outgoing = (points[(i + 1).min(last)] - points[i]).normalize_or_zero();
                let tangent = (incoming + outgoing).normalize_or_zero();
                let normal = tangent.perp();

                // Miter length grows as the segments fold; cap it at 4x
                let segment_normal = if outgoing != Vec2::ZERO {
                    outgoing.perp()
                } else {
                    incoming.perp()
                };
                let cos = normal.dot(segment_normal).max(0.25);
                normal * (half / cos)
            })
            .collect();

        let mut vertices = Vec::with_capacity(last * 6);
        for i in 0..last {
            let (za, zb) = (self.positions[i].z, self.positions[i + 1].z);
            let a_low = (points[i] - offsets[i]).extend(za);
            let a_high = (points[i] + offsets[i]).extend(za);
            let b_low = (points[i + 1] - offsets[i + 1]).extend(zb);
            let b_high = (points[i + 1] + offsets[i + 1]).extend(zb);

            vertices.extend_from_slice(&[a_low, a_high, b_high, a_low, b_high, b_low]);
        }
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_layout() {
        let heights = HeightSample::from(vec![1.0, 2.0, 3.0]);
        let line = LineStrip::from_heights(&heights).unwrap();

        assert_eq!(
            line.positions(),
            &[
                Vec3::new(-1.5, 1.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(1.5, 3.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_single_point_rejected() {
        let heights = HeightSample::from(vec![1.0]);
        assert!(matches!(
            LineStrip::from_heights(&heights),
            Err(VisualizerError::TooFewPoints(1))
        ));
    }

    #[test]
    fn test_flat_outline_has_requested_width() {
        let heights = HeightSample::from(vec![2.0; 4]);
        let line = LineStrip::from_heights(&heights).unwrap();

        let quads = line.outline_quads(0.1);

        assert_eq!(quads.len(), 3 * 6);
        for v in &quads {
            assert!((v.y - 2.0).abs() - 0.05 < 1e-5);
            assert!((v.y - 2.0).abs() > 0.04);
            assert_eq!(v.z, 0.0);
        }
    }
}
