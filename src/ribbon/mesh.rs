//! Extruded, double-sided, Y-mirrored fill mesh rebuilt every frame.

use glam::Vec3;

use super::{ColumnLayout, Vertex};
use crate::error::{Result, VisualizerError};
use crate::spectrum::HeightSample;

/// Closed ribbon solid: upper half followed by its Y-mirrored copy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RibbonMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl RibbonMesh {
    /// Number of vertices in one (unmirrored) half
    pub fn half_vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn position(&self, index: u32) -> Vec3 {
        Vec3::from_array(self.vertices[index as usize].position)
    }

    /// Unnormalised face normal of a triangle (right-hand rule)
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vec3 {
        let [a, b, c] = triangle.map(|i| self.position(i));
        (b - a).cross(c - a)
    }
}

/// Builds [`RibbonMesh`] from sampled heights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonMeshBuilder {
    fill_depth: f32,
}

impl RibbonMeshBuilder {
    pub fn new(fill_depth: f32) -> Self {
        Self { fill_depth }
    }

    pub fn fill_depth(&self) -> f32 {
        self.fill_depth
    }

    /// Build the full solid for one frame.
    ///
    /// Vertex order per half: front strip (2n), back strip (2n), front
    /// boundary loop (2n), back boundary loop (2n). Index order per half:
    /// front, back, side skirt.
    pub fn build(&self, heights: &HeightSample) -> Result<RibbonMesh> {
        let n = heights.len();
        if n < 2 {
            return Err(VisualizerError::TooFewPoints(n));
        }

        let layout = ColumnLayout::new(n);
        let depth = Vec3::new(0.0, 0.0, self.fill_depth);
        let strip_len = 2 * n;
        let loop_len = 2 * n;

        let mut positions: Vec<Vec3> = Vec::with_capacity(4 * strip_len);

        // Front strip: baseline / top interleaved per column
        for (i, &h) in heights.iter().enumerate() {
            let x = layout.x(i);
            positions.push(Vec3::new(x, 0.0, 0.0));
            positions.push(Vec3::new(x, h, 0.0));
        }

        // Back strip
        for i in 0..strip_len {
            positions.push(positions[i] + depth);
        }

        // Boundary loop: baseline left -> right, then top right -> left
        let boundary_front = positions.len();
        for i in 0..n {
            positions.push(Vec3::new(layout.x(i), 0.0, 0.0));
        }
        for i in (0..n).rev() {
            positions.push(Vec3::new(layout.x(i), heights[i], 0.0));
        }
        let boundary_back = positions.len();
        for i in 0..loop_len {
            positions.push(positions[boundary_front + i] + depth);
        }

        let front = strip_triangles(n);
        let back = reversed_with_offset(&front, strip_len as u32);
        let side = skirt_triangles(loop_len, boundary_front as u32, boundary_back as u32);

        let mut indices = Vec::with_capacity(2 * (front.len() + back.len() + side.len()));
        indices.extend_from_slice(&front);
        indices.extend_from_slice(&back);
        indices.extend_from_slice(&side);

        mirror_y(&mut positions, &mut indices);
        let normals = vertex_normals(&positions, &indices);

        let vertices = positions
            .iter()
            .zip(&normals)
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();

        Ok(RibbonMesh { vertices, indices })
    }
}

/// Two triangles per adjacent column pair of the interleaved strip
fn strip_triangles(columns: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity((columns - 1) * 6);
    for i in 0..columns - 1 {
        let base = (i * 2) as u32;
        let top = base + 1;
        let next_base = base + 2;
        let next_top = base + 3;

        indices.extend_from_slice(&[base, top, next_top, base, next_top, next_base]);
    }
    indices
}

/// Same triangles shifted by `offset` with winding flipped (c, b, a)
fn reversed_with_offset(indices: &[u32], offset: u32) -> Vec<u32> {
    indices
        .chunks_exact(3)
        .flat_map(|t| [t[2] + offset, t[1] + offset, t[0] + offset])
        .collect()
}

/// Quads joining the front and back boundary rings, wrapping at the end
fn skirt_triangles(loop_len: usize, front: u32, back: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(loop_len * 6);
    for i in 0..loop_len {
        let next = ((i + 1) % loop_len) as u32;
        let i = i as u32;

        let f0 = front + i;
        let f1 = front + next;
        let b1 = back + next;
        let b0 = back + i;

        indices.extend_from_slice(&[f0, f1, b1, f0, b1, b0]);
    }
    indices
}

/// Append a copy reflected across y = 0 with every triangle reversed
fn mirror_y(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let vertex_count = positions.len();
    let offset = vertex_count as u32;

    positions.extend_from_within(..);
    for p in &mut positions[vertex_count..] {
        p.y = -p.y;
    }

    let mirrored = reversed_with_offset(indices, offset);
    indices.extend_from_slice(&mirrored);
}

/// Area-weighted smooth normals; vertices on degenerate faces get zero
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for t in indices.chunks_exact(3) {
        let (a, b, c) = (t[0] as usize, t[1] as usize, t[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize, h: f32) -> HeightSample {
        HeightSample::from(vec![h; n])
    }

    #[test]
    fn test_vertex_and_index_counts() {
        let n = 6;
        let mesh = RibbonMeshBuilder::new(1.0).build(&flat(n, 2.0)).unwrap();

        assert_eq!(mesh.half_vertex_count(), 8 * n);
        assert_eq!(mesh.vertices.len(), 16 * n);

        let faces = 2 * (n - 1) * 6;
        let side = 2 * n * 6;
        assert_eq!(mesh.indices.len(), 2 * (faces + side));
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = RibbonMeshBuilder::new(0.5).build(&flat(9, 1.0)).unwrap();
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_too_few_points() {
        let builder = RibbonMeshBuilder::new(1.0);
        assert!(matches!(
            builder.build(&flat(1, 1.0)),
            Err(VisualizerError::TooFewPoints(1))
        ));
        assert!(builder.build(&flat(0, 1.0)).is_err());
    }

    #[test]
    fn test_two_points_form_one_quad() {
        let mesh = RibbonMeshBuilder::new(1.0).build(&flat(2, 1.0)).unwrap();
        // Front + back + 4 skirt quads, doubled
        assert_eq!(mesh.triangle_count(), 2 * (2 + 2 + 8));
    }

    #[test]
    fn test_back_strip_offset_by_depth() {
        let n = 3;
        let mesh = RibbonMeshBuilder::new(2.5).build(&flat(n, 1.0)).unwrap();
        for i in 0..2 * n as u32 {
            let front = mesh.position(i);
            let back = mesh.position(i + 2 * n as u32);
            assert_eq!(back - front, Vec3::new(0.0, 0.0, 2.5));
        }
    }

    #[test]
    fn test_boundary_loop_order() {
        let heights = HeightSample::from(vec![1.0, 2.0, 3.0]);
        let mesh = RibbonMeshBuilder::new(1.0).build(&heights).unwrap();
        let start = 12; // after front and back strips

        let loop_ys: Vec<f32> = (start..start + 6).map(|i| mesh.position(i).y).collect();
        assert_eq!(loop_ys, vec![0.0, 0.0, 0.0, 3.0, 2.0, 1.0]);

        let loop_xs: Vec<f32> = (start..start + 6).map(|i| mesh.position(i).x).collect();
        assert_eq!(loop_xs, vec![-1.5, 0.0, 1.5, 1.5, 0.0, -1.5]);
    }

    #[test]
    fn test_normals_are_unit_length() {
        let heights = HeightSample::from(vec![0.5, 3.0, 1.0, 2.0]);
        let mesh = RibbonMeshBuilder::new(1.0).build(&heights).unwrap();
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal length {}", len);
        }
    }

    #[test]
    fn test_front_normals_face_negative_z() {
        let n = 4;
        let mesh = RibbonMeshBuilder::new(1.0).build(&flat(n, 2.0)).unwrap();
        for (i, v) in mesh.vertices[..4 * n].iter().enumerate() {
            let expected = if i < 2 * n { Vec3::NEG_Z } else { Vec3::Z };
            assert!(Vec3::from_array(v.normal).abs_diff_eq(expected, 1e-5));
        }
    }
}
