//! Line graph and extruded, mirrored fill geometry.

mod line;
mod mesh;

pub use line::LineStrip;
pub use mesh::{RibbonMesh, RibbonMeshBuilder};

use bytemuck::{Pod, Zeroable};

/// Vertex data for the ribbon mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Symmetric X layout: `amount` points spread over `amount` world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub start_x: f32,
    pub spacing: f32,
}

impl ColumnLayout {
    /// Layout for `amount` columns. Callers guarantee `amount >= 2`.
    pub fn new(amount: usize) -> Self {
        let width = amount as f32;
        Self {
            start_x: -width / 2.0,
            spacing: width / (amount - 1) as f32,
        }
    }

    /// X coordinate of column `index`
    pub fn x(&self, index: usize) -> f32 {
        self.start_x + index as f32 * self.spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_symmetric() {
        let layout = ColumnLayout::new(5);
        assert_eq!(layout.x(0), -2.5);
        assert_eq!(layout.x(4), 2.5);
        assert_eq!(layout.spacing, 1.25);
    }
}
