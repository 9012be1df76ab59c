//! Camera presets.

use serde::Deserialize;

/// Fixed camera position
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixedCamera {
    /// Camera position (world units)
    pub position: [f32; 3],

    /// Look-at target (world units)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 6.0, -60.0], // In front of the -Z facing ribbon
            target: [0.0, 0.0, 0.5],     // Middle of the fill depth
        }
    }
}

/// Slow orbit around the origin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    /// Horizontal distance from the origin (world units)
    pub radius: f32,

    /// Height above the baseline (world units)
    pub height: f32,

    /// Angular speed (radians per second)
    pub angular_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 60.0,
            height: 15.0,
            angular_speed: 0.15,
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone, PartialEq)]
pub enum CameraPreset {
    /// Stationary camera facing the front of the ribbon
    Fixed(FixedCamera),

    /// Camera circling the scene at constant height
    Orbit(OrbitCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}
